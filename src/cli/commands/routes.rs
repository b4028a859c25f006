use serde_json::json;

use crate::cli::{build_api, config::ServeConfig};
use crate::config::AppConfig;

pub fn handle(app_config: &AppConfig, serve_config: &ServeConfig, as_json: bool) -> anyhow::Result<()> {
    let api = build_api(app_config, serve_config)?;

    if as_json {
        let table: Vec<_> = api
            .routes()
            .iter()
            .map(|r| {
                json!({
                    "method": r.method.as_str(),
                    "path": r.path,
                    "operation": r.operation,
                    "auth": r.auth,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    for route in api.routes() {
        let auth = match &route.auth {
            Some(auth) => format!("{} [{}]", auth.strategy, auth.scope.join(", ")),
            None => "public".to_string(),
        };
        println!("{:<7} {:<40} {:<17} {}", route.method.as_str(), route.path, route.operation.name(), auth);
    }

    Ok(())
}
