// tests/harness/controllers.rs
//
// Sample controllers written the way application code would use the
// request/response objects.

use controller_harness::{Next, Request, Response};
use eyre::{eyre, Result};
use serde_json::{json, Value};

/// GET /users/:id
pub fn show_user(req: &Request, res: &mut Response, next: &mut Next) -> Result<()> {
    let Some(id) = req.param("id").and_then(Value::as_u64) else {
        next.fail(eyre!("missing user id"));
        return Ok(());
    };
    res.status(200).json(json!({"id": id, "name": format!("user-{}", id)}));
    Ok(())
}

/// POST /posts, requires an authenticated user.
pub fn create_post(req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    let Some(author) = req.user_field("id").cloned() else {
        res.status(401).send("unauthorized");
        return Ok(());
    };
    let title = req
        .body_field("title")
        .and_then(Value::as_str)
        .ok_or_else(|| eyre!("title is required"))?;

    res.set("Location", "/posts/1")
        .status(201)
        .json(json!({"id": 1, "title": title, "author": author}));
    Ok(())
}

/// GET /admin
pub fn admin_dashboard(req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    match req.user_field("role").and_then(Value::as_str) {
        Some("admin") => {
            res.render("admin/dashboard", json!({"user": req.user_field("name")}));
        }
        _ => {
            res.send_status(403);
        }
    }
    Ok(())
}

/// POST /logout
pub fn logout(_req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    res.clear_cookie("sid").redirect("/login");
    Ok(())
}

/// GET /reports/:id
pub fn download_report(req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    let id = req.param("id").and_then(Value::as_str).unwrap_or("latest");
    res.attachment("report.csv")
        .download(&format!("/reports/{}.csv", id));
    Ok(())
}

/// GET /points, for harnesses in replace auth mode.
pub fn points_balance(req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    let balance = req
        .user_field("points")
        .and_then(|points| points.get("balance"))
        .cloned()
        .unwrap_or(Value::from(0));
    res.json(json!({"balance": balance}));
    Ok(())
}

/// Echoes every top-level request field it can see.
pub fn echo_request(req: &Request, res: &mut Response, _next: &mut Next) -> Result<()> {
    res.json(json!({
        "params": req.params(),
        "body": req.body(),
        "user": req.user(),
        "locale": req.field("locale"),
    }));
    Ok(())
}

/// Never responds.
pub fn silent(_req: &Request, _res: &mut Response, _next: &mut Next) -> Result<()> {
    Ok(())
}
