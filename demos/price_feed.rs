use content_token_oracle::PriceOracle;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Content Token Oracle Example");
    println!("============================");

    // Requires YOUTUBE_API_KEY in the environment
    let oracle = PriceOracle::from_env()?;

    oracle.add_token(1001, "dQw4w9WgXcQ").await;
    oracle.add_token(1002, "9bZkp7q19f0").await;

    let sub = oracle.subscribe(|update| {
        println!("{update}");
    });

    oracle.start(Duration::from_secs(30)).await;

    // Watch loop
    for _ in 0..5 {
        sleep(Duration::from_secs(35)).await;

        println!("\n{:-<60}", "");
        for token in oracle.get_all_token_prices().await {
            println!(
                "asset {:<8} {:<30} {:>10.4} ({:+.2}%)",
                token.asset_id,
                token.video_title.as_deref().unwrap_or("(unknown title)"),
                token.current_price,
                token.price_change_percent
            );
        }
    }

    let stats = oracle.price_statistics().await;
    println!(
        "\n{} tokens, avg price {:.4}, total cap {:.0}",
        stats.total_tokens, stats.average_price, stats.total_market_cap
    );

    sub.unsubscribe();
    oracle.stop().await;
    Ok(())
}
