use dotenv::dotenv;
use serde_json::json;
use std::env;
use std::sync::Arc;

use resto_collegues::auth::MemoryAuth;
use resto_collegues::postgrest::MemoryStore;
use resto_collegues::prelude::*;
use resto_collegues::profile::achievements;
use resto_collegues::restaurants::SearchFilter;
use resto_collegues::storage::MemoryStorage;

/// Backends to talk to: the Supabase project from the environment, or an
/// in-memory sandbox seeded with a few restaurants.
async fn backends() -> Result<(Resto, Credentials)> {
    if let (Ok(_), Ok(email), Ok(password)) = (
        env::var("SUPABASE_URL"),
        env::var("DEMO_EMAIL"),
        env::var("DEMO_PASSWORD"),
    ) {
        println!("Using the Supabase project from the environment");
        let resto = Resto::connect(RestoConfig::from_env()?, None).await?;
        return Ok((resto, Credentials::new(&email, &password)));
    }

    println!("SUPABASE_URL, DEMO_EMAIL or DEMO_PASSWORD not set; using in-memory backends");
    let auth = Arc::new(MemoryAuth::new());
    auth.add_account("demo@example.com", "demo-password");
    auth.finish_loading();

    let store = Arc::new(MemoryStore::new());
    store.seed(
        "restaurants",
        vec![
            json!({
                "id": "seed-1",
                "name": "Da Mario",
                "cuisine_type": "Italienne",
                "price_range": "€€",
                "address": "3 rue Nationale, Lille",
                "user_id": "someone",
                "created_at": "2024-05-01T12:00:00Z"
            }),
            json!({
                "id": "seed-2",
                "name": "Sakura",
                "cuisine_type": "Japonaise",
                "price_range": "€€€",
                "address": "8 quai de Bercy, Paris",
                "user_id": "someone",
                "created_at": "2024-05-02T12:00:00Z"
            }),
        ],
    );

    let resto = Resto::with_backends(
        ClientOptions::default(),
        auth,
        store,
        Arc::new(MemoryStorage::new()),
    );
    Ok((resto, Credentials::new("demo@example.com", "demo-password")))
}

fn print_notifications(app: &mut App) {
    for notification in app.notifications.drain() {
        println!("  [{}] {}", notification.title, notification.description);
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let (resto, credentials) = backends().await?;
    let gate = resto.gate();
    println!("Gate: {}", gate.view().caption());

    gate.login(&credentials).await?;
    let session = match gate.view() {
        GateView::Shell(session) => session,
        other => {
            println!("Login did not open the shell: {:?}", other);
            return Ok(());
        }
    };
    println!("Signed in as {}", session.user.name());

    let mut app = resto.app(session);

    println!("\n== Home ==");
    app.navigate(Page::Home).await;
    for restaurant in &app.browse.restaurants {
        println!(
            "  {} ({}, {}) - {}",
            restaurant.name, restaurant.cuisine_type, restaurant.price_range, restaurant.address
        );
    }

    println!("\n== Search \"ital\" ==");
    app.browse.search = SearchFilter::new("ital", None, None);
    for restaurant in app.visible_restaurants() {
        println!("  {}", restaurant.name);
    }

    if let Some(first) = app.browse.restaurants.first().map(|r| r.id.clone()) {
        println!("\n== Voting on {} ==", first);
        app.vote(&first, VoteDirection::Up).await;
        println!("  state: {:?}", app.vote_state(&first));
        app.vote(&first, VoteDirection::Up).await;
        println!("  state: {:?}", app.vote_state(&first));
        print_notifications(&mut app);
    }

    println!("\n== Adding a restaurant ==");
    app.navigate(Page::Add).await;
    app.form = RestaurantForm {
        name: "Le Petit Bouchon".to_string(),
        cuisine_type: Some(CuisineType::Francaise),
        price_range: Some(PriceRange::Moderate),
        address: "4 rue Mercière, Lyon".to_string(),
        description: "Quenelles et tarte aux pralines".to_string(),
    };
    if let Some(created) = app.submit().await {
        println!("  created {} ({})", created.name, created.id);
    }
    print_notifications(&mut app);

    println!("\n== My recommendations ==");
    app.navigate(Page::MyRecommendations).await;
    for restaurant in &app.mine.restaurants {
        let count = app.mine.count_for(&restaurant.id);
        println!(
            "  {}: +{} / -{}",
            restaurant.name, count.up_votes, count.down_votes
        );
    }

    println!("\n== Profile ==");
    app.navigate(Page::Profile).await;
    let badge = app.stats.badge();
    println!("  badge: {} ({})", badge.label(), badge.color());
    for achievement in achievements(&app.stats) {
        let mark = if achievement.unlocked { "x" } else { " " };
        match &achievement.hint {
            Some(hint) => println!("  [{}] {} - {}", mark, achievement.title, hint),
            None => println!("  [{}] {}", mark, achievement.title),
        }
    }

    app.logout().await;
    println!("\nGate: {:?}", resto.gate().view());
    Ok(())
}
