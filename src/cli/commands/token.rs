use crate::access::Scope;
use crate::auth::JwtAuthentication;
use crate::config::AppConfig;

pub fn handle(app_config: &AppConfig, id: String, scopes: Vec<String>) -> anyhow::Result<()> {
    let scope = match scopes.len() {
        0 => None,
        1 => Some(Scope::Role(scopes[0].clone())),
        _ => Some(Scope::Roles(scopes)),
    };

    let token = JwtAuthentication::from_config(app_config).issue(id, scope)?;
    println!("{}", token);
    Ok(())
}
