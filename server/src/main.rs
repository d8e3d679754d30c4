mod config;
mod http;

use std::sync::Arc;

use anyhow::Result;
use platform_obs::{ObsConfig, init_tracing};
use products_hr::EmployeeRepository;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load();
    let _obs = init_tracing(ObsConfig::default().with_env())?;
    let state = AppState {
        employees: Arc::new(EmployeeRepository::new()),
    };
    http::serve(ServeConfig::from(&config), state).await
}
