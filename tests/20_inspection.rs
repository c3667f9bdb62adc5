mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn query_returns_trimmed_rows() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server
        .client
        .post(server.url("/inspection/query"))
        .bearer_auth(&token)
        .json(&json!({ "query": "SELECT CODPROD, DESCRPROD FROM TGFPRO" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let rows = res.json::<Vec<Value>>().await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["DESCRPROD"], "PARAFUSO SEXTAVADO");
    assert_eq!(rows[1]["DESCRPROD"], "PORCA 1/2");
    assert_eq!(rows[0]["CODPROD"], 1);
    Ok(())
}

#[tokio::test]
async fn write_statements_never_reach_upstream() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    for query in [
        "DELETE FROM TGFPRO",
        "SELECT CODPROD FROM TGFPRO; DROP TABLE TGFPRO",
        "SELECT * FROM TGFPRO",
        "SELECT CODPROD, IMAGEM FROM TGFPRO",
        "",
    ] {
        let res = server
            .client
            .post(server.url("/inspection/query"))
            .bearer_auth(&token)
            .json(&json!({ "query": query }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query {:?}", query);
    }

    assert!(server.upstream.queries().is_empty());
    Ok(())
}

#[tokio::test]
async fn upstream_sql_errors_carry_developer_details() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server
        .client
        .post(server.url("/inspection/query"))
        .bearer_auth(&token)
        .json(&json!({ "query": "SELECT CODPROD FROM NAO_EXISTE" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let message = res.json::<Value>().await?["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("| DEV: "), "{}", message);
    assert!(message.contains("Invalid object name"), "{}", message);
    assert!(message.contains("QUERY: SELECT CODPROD FROM NAO_EXISTE"), "{}", message);
    Ok(())
}

#[tokio::test]
async fn table_schema_requires_table_name() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server.get_as("/inspection/table-schema", &token).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.get_as("/inspection/table-schema?tableName=TGFPRO", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["columns"][0]["COLUMN_NAME"], "CODPROD");
    Ok(())
}

#[tokio::test]
async fn invalid_table_names_are_rejected() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server
        .get_as("/inspection/table-relations?tableName=TGFPRO%3BDROP", &token)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.upstream.inspections(), 0);
    Ok(())
}

#[tokio::test]
async fn primary_keys_are_proxied() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server.get_as("/inspection/primary-keys/TGFPRO", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([{ "COLUMN_NAME": "CODPROD" }]));
    Ok(())
}

#[tokio::test]
async fn table_info_is_cached_until_invalidated() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let first = server.get_as("/inspection/table-info/TGFPRO", &token).await?.json::<Value>().await?;
    assert_eq!(first["name"], "TGFPRO");
    assert_eq!(first["cached"], false);
    assert!(first["lastUpdated"].is_string());

    let second = server.get_as("/inspection/table-info/tgfpro", &token).await?.json::<Value>().await?;
    assert_eq!(second["cached"], true);
    assert_eq!(server.upstream.inspections(), 1);

    let res = server
        .client
        .delete(server.url("/inspection/table-info/TGFPRO"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["removed"], true);

    let third = server.get_as("/inspection/table-info/TGFPRO", &token).await?.json::<Value>().await?;
    assert_eq!(third["cached"], false);
    assert_eq!(server.upstream.inspections(), 2);
    Ok(())
}

#[tokio::test]
async fn module_info_maps_fields_and_relations() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server.get_as("/inspection/table-info/TGFPRO/module", &token).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["tableName"], "TGFPRO");
    assert_eq!(body["primaryKey"], "CODPROD");
    assert_eq!(body["fields"][0]["type"], "number");
    assert_eq!(body["fields"][1]["type"], "string");
    assert_eq!(body["fields"][1]["maxLength"], 40);
    assert_eq!(body["relations"][0]["table"], "TGFGRU");
    Ok(())
}

#[tokio::test]
async fn malformed_body_gets_json_error() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = common::make_token("ADMIN", 600);

    let res = server
        .client
        .post(server.url("/inspection/query"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body(r#"{"query": "#)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "INVALID_JSON");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(server.upstream.queries().is_empty());
    Ok(())
}
