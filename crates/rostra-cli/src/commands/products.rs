use anyhow::Result;
use rostra_search::Services;

pub async fn list_products(services: &Services, json: bool) -> Result<()> {
    let catalog = services.resolver().get_available_products().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No data products found. Run the indexing pipeline first to index speeches.");
        return Ok(());
    }

    println!("\n📚 Data Products\n");
    for product in &catalog {
        let dataset = if product.object_store_present {
            "dataset ✓"
        } else {
            "dataset ✗"
        };
        println!(
            "  {:<18} {:<22} {:>8} vectors   {}",
            product.key(),
            product.definition.label,
            product.vector_count,
            dataset
        );
        if !product.definition.description.is_empty() {
            println!("  {:<18} {}", "", product.definition.description);
        }
    }

    println!("\n  Total: {} product(s)", catalog.len());
    Ok(())
}
