use rostra_search::{check_services, Config, Services};

pub async fn show_status(services: &Services, config: &Config) {
    let status = check_services(services).await;

    let endpoints = [
        config.weaviate_url.as_str(),
        config.embedding_endpoint.as_str(),
        config.lakefs_endpoint.as_str(),
    ];

    println!("\n🩺 Rostra Status\n");
    for ((name, up), endpoint) in status.entries().into_iter().zip(endpoints) {
        let mark = if up { "✓" } else { "✗" };
        println!("  {} {:<14} {}", mark, name, endpoint);
    }

    println!(
        "\n  Snapshot: {}@{}",
        services.snapshot.repository, services.snapshot.reference
    );
    println!("  Registered products: {}", services.registry.len());

    if !status.all_up() {
        println!("\n  Some services are unreachable; search and statistics may fail.");
    }
}
