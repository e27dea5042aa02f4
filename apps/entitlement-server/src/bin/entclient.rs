//! Sample entitlement client: asks the oracle once and prints the answer.
//!
//! ```text
//! entclient --grpc-port 21001 --action write --userid alice --value logtest00000999
//! ```

use std::time::Duration;

use clap::Parser;
use entitlement::GrpcConnector;
use entitlement::domain::OracleConnector;
use entitlement_sdk::{EntitlementOracleClient, EntitlementQuery};

#[derive(Debug, Parser)]
#[command(name = "entclient", about = "Ask the entitlement oracle once", version)]
struct Cli {
    /// Oracle gRPC port on localhost
    #[arg(long, default_value_t = 21001)]
    grpc_port: u16,

    /// Action, e.g. read or write
    #[arg(long, default_value = "")]
    action: String,

    /// User ID the decision is for
    #[arg(long, default_value = "")]
    userid: String,

    /// Label value
    #[arg(long, default_value = "")]
    value: String,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let oracle = GrpcConnector.connect(
        &format!("localhost:{}", cli.grpc_port),
        Duration::from_secs(cli.timeout_secs),
    )?;
    let query = EntitlementQuery::new(cli.action, cli.userid, cli.value);

    if oracle.entitled(&query).await? {
        println!("Entitled");
    } else {
        println!("Not entitled");
    }
    Ok(())
}
