use clap::Parser;
use std::net::IpAddr;

/// Turn receipts, invoices and card statements into journal entries
/// and sync them into a spreadsheet ledger.
#[derive(Parser, Debug)]
pub struct Args {
    /// Address to bind the HTTP server to
    #[clap(long, default_value = "127.0.0.1")]
    pub address: IpAddr,

    /// Port to listen on
    #[clap(long, default_value_t = 5001)]
    pub port: u16,
}

pub fn parse() -> Args {
    Args::parse()
}
