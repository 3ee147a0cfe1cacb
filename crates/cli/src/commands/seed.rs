//! Seed the coaching knowledge base.
//!
//! The knowledge base holds the curated FAQ entries the coach splices
//! into its prompt when a chat message matches one. This command loads
//! the starter set a fresh deployment needs.

use tracing::info;

use willpower_server::db::{self, KnowledgeRepository};

/// Starter FAQ entries: (topic, question, answer).
const STARTER_ENTRIES: &[(&str, &str, &str)] = &[
    (
        "pricing",
        "How much is membership?",
        "Membership is $225/month and includes personalized coaching from \
         Will Power plus a free t-shirt when you sign up.",
    ),
    (
        "pricing",
        "Can I cancel my membership?",
        "Yes, you can cancel any time. Your access runs through the end of \
         the billing period you already paid for.",
    ),
    (
        "tshirt",
        "When does my free t-shirt arrive?",
        "Your t-shirt ships within a week of signing up. You'll pick a size \
         at checkout and we'll send tracking once it's on the way.",
    ),
    (
        "training",
        "How often should I work out?",
        "Start with 3 strength sessions per week with at least one rest day \
         between them. Consistency beats intensity while you build the habit.",
    ),
    (
        "nutrition",
        "What should I eat to lose weight?",
        "Aim for a modest calorie deficit built around protein at every meal, \
         vegetables, and foods you actually enjoy. No banned foods, just \
         portions that match your goal.",
    ),
    (
        "recovery",
        "How much sleep do I need?",
        "Aim for 7-9 hours. Sleep is when your body adapts to training; \
         cutting it short undercuts every workout you do.",
    ),
    (
        "accountability",
        "How does coaching keep me on track?",
        "You check in with Will Power whenever you need to. Access is key. \
         Accountability is the price. Following-through opens the door.",
    ),
];

/// Seed the knowledge base with the starter FAQ entries.
///
/// Skips seeding when entries already exist unless `force` is set, so
/// re-running the command against a live database is safe.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or an insert fails.
pub async fn knowledge_base(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:willpower_fitness.db".to_string());

    let pool = db::create_pool(&database_url).await?;
    db::MIGRATOR.run(&pool).await?;
    info!("Connected to database");

    let repo = KnowledgeRepository::new(&pool);

    let existing = repo.count().await?;
    if existing > 0 && !force {
        info!(existing, "Knowledge base already seeded, use --force to add anyway");
        return Ok(());
    }

    info!(entries = STARTER_ENTRIES.len(), "Seeding knowledge base");
    for (topic, question, answer) in STARTER_ENTRIES {
        repo.add(topic, question, answer).await?;
    }

    info!("Seeding complete!");
    info!("  Entries inserted: {}", STARTER_ENTRIES.len());
    info!("  Total entries: {}", repo.count().await?);

    Ok(())
}
