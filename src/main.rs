use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = sheetbook::args::parse();
    sheetbook::server::serve(args).await
}
