mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn student_lifecycle() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let url = server.url("/api/students");

    let student_id = common::unique("s");
    let email = format!("{}@uni.example.edu", student_id);

    let (status, body) = common::call(client.post(&url).json(&json!({
        "student_id": student_id,
        "name": "Ann <b>Lee</b>",
        "email": email,
        "password": "first-password"
    })))
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["name"], "Ann Lee");
    assert!(body["data"].get("password_hash").is_none(), "hash leaked: {}", body);

    // Same email under another id
    let (status, _) = common::call(client.post(&url).json(&json!({
        "student_id": common::unique("s"),
        "name": "Copy",
        "email": email,
        "password": "first-password"
    })))
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = common::call(client.get(&url).query(&[("search", student_id.as_str())])).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["student_id"], student_id.as_str());

    let (status, body) = common::call(client.put(&url).json(&json!({
        "student_id": student_id,
        "name": "Ann Marie Lee"
    })))
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["name"], "Ann Marie Lee");
    assert_eq!(body["data"]["email"], email.as_str());

    let (status, body) = common::call(
        client
            .post(format!("{}?action=change_password", url))
            .json(&json!({
                "student_id": student_id,
                "current_password": "not-the-password",
                "new_password": "second-password"
            })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = common::call(
        client
            .post(format!("{}?action=change_password", url))
            .json(&json!({
                "student_id": student_id,
                "current_password": "first-password",
                "new_password": "second-password"
            })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // The old password no longer validates, the new one does
    let (status, body) = common::call(
        client
            .post(format!("{}?action=change_password", url))
            .json(&json!({
                "student_id": student_id,
                "current_password": "first-password",
                "new_password": "third-password"
            })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = common::call(
        client
            .post(format!("{}?action=change_password", url))
            .json(&json!({
                "student_id": student_id,
                "current_password": "second-password",
                "new_password": "third-password"
            })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::call(client.delete(&url).query(&[("student_id", student_id.as_str())])).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::call(client.get(&url).query(&[("student_id", student_id.as_str())])).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");

    Ok(())
}

#[tokio::test]
async fn email_update_conflicts_with_other_student() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let url = server.url("/api/students");

    let first = common::unique("s");
    let second = common::unique("s");
    for id in [&first, &second] {
        let (status, body) = common::call(client.post(&url).json(&json!({
            "student_id": id,
            "name": "Student",
            "email": format!("{}@uni.example.edu", id),
            "password": "long-enough"
        })))
        .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (status, body) = common::call(client.put(&url).json(&json!({
        "student_id": second,
        "email": format!("{}@uni.example.edu", first)
    })))
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    // Re-saving your own email is not a conflict
    let (status, _) = common::call(client.put(&url).json(&json!({
        "student_id": second,
        "email": format!("{}@uni.example.edu", second)
    })))
    .await?;
    assert_eq!(status, StatusCode::OK);

    for id in [&first, &second] {
        common::call(client.delete(&url).query(&[("student_id", id.as_str())])).await?;
    }
    Ok(())
}

#[tokio::test]
async fn sort_garbage_falls_back_to_default_order() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (status, body) = common::call(
        client
            .get(server.url("/api/students"))
            .query(&[("sort", "name; DROP TABLE students"), ("order", "sideways")]),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"].is_array());
    Ok(())
}
