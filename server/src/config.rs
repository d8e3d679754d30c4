use std::net::{IpAddr, Ipv4Addr};

use clap::Parser;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Clone, Debug)]
#[command(name = "hr-server", version, about = "Employee records service")]
pub struct AppConfig {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl AppConfig {
    /// Reads `.env` when present, then flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}
