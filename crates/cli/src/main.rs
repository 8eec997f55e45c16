use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::UserId;
use pipeline::FusedScore;
use rand::seq::IndexedRandom;
use server::{EngineConfig, HybridQuery, MovieRecommendation, RecommendationOrchestrator};
use sources::SimilarMovie;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// movie-recs - Hybrid Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie recommendations from content similarity and collaborative filtering", long_about = None)]
struct Cli {
    /// Directory holding catalog.dat, movies.dat, ratings.dat and factors.json
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies similar to a title (content-based)
    Similar {
        /// Movie title (case-insensitive)
        #[arg(long)]
        title: String,

        /// Number of movies to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Movies predicted for a user (collaborative)
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fused content and collaborative recommendations
    Hybrid {
        /// Anchor movie title
        #[arg(long)]
        title: String,

        /// Personalize for this user; otherwise a user who liked the title is sampled
        #[arg(long)]
        user_id: Option<UserId>,

        /// Number of recommendations to return (1-20)
        #[arg(long)]
        top_n: Option<usize>,

        /// Weight of the content ranking (0-1)
        #[arg(long)]
        weight_content: Option<f32>,

        /// Weight of the collaborative ranking (0-1)
        #[arg(long)]
        weight_collab: Option<f32>,

        /// Seed for the user sampling, for repeatable output
        #[arg(long)]
        seed: Option<u64>,

        /// Show the positional scores behind each result
        #[arg(long)]
        explain: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show a user's rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    debug!(?config, "Resolved configuration");

    // Load artifacts (this may take a moment)
    println!("Loading artifacts from {}...", config.data_dir.display());
    let start = Instant::now();
    let orchestrator = RecommendationOrchestrator::load(config)
        .await
        .context("Failed to load serving artifacts")?;
    println!("{} Loaded artifacts in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Similar { title, limit } => handle_similar(&orchestrator, &title, limit).await?,
        Commands::Recommend { user_id, limit } => {
            handle_recommend(&orchestrator, user_id, limit).await?
        }
        Commands::Hybrid {
            title,
            user_id,
            top_n,
            weight_content,
            weight_collab,
            seed,
            explain,
        } => {
            let query = HybridQuery {
                title,
                user_id,
                top_n,
                weight_content,
                weight_collab,
                seed,
            };
            handle_hybrid(&orchestrator, query, explain).await?
        }
        Commands::Search { title } => handle_search(&orchestrator, &title),
        Commands::User { user_id } => handle_user(&orchestrator, user_id),
        Commands::Benchmark { requests } => handle_benchmark(&orchestrator, requests).await?,
    }

    Ok(())
}

/// Handle the 'similar' command
async fn handle_similar(
    orchestrator: &RecommendationOrchestrator,
    title: &str,
    limit: Option<usize>,
) -> Result<()> {
    let similar = orchestrator.content_recommend(title, limit).await?;
    print_similar(title, &similar);
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    user_id: UserId,
    limit: Option<usize>,
) -> Result<()> {
    let recommendations = orchestrator.collaborative_recommend(user_id, limit).await?;
    print_recommendations(user_id, &recommendations);
    Ok(())
}

/// Handle the 'hybrid' command
async fn handle_hybrid(
    orchestrator: &RecommendationOrchestrator,
    query: HybridQuery,
    explain: bool,
) -> Result<()> {
    let title = query.title.clone();
    let fused = orchestrator.hybrid_recommend(query).await?;
    if fused.is_empty() {
        println!("{}", format!("No movie titled '{}' in the catalog", title).yellow());
        return Ok(());
    }
    print_fused(&title, &fused, explain);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(orchestrator: &RecommendationOrchestrator, title: &str) {
    let titles = orchestrator.collaborative().titles();
    let history = orchestrator.collaborative().history();
    let matches = titles.search(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        let (avg_rating, rating_count) = history
            .get_movie_stats(movie.id)
            .map(|s| (s.avg_rating, s.rating_count))
            .unwrap_or((0.0, 0));
        let content = if orchestrator.content().knows_title(&movie.title) {
            ""
        } else {
            " (no content metadata)"
        };
        println!(
            "{}: {} ({}) [{}] avg {:.2} ({} ratings){}",
            movie.id,
            movie.title,
            movie.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            movie.genres.join(", "),
            avg_rating,
            rating_count,
            content.dimmed()
        );
    }
}

/// Handle the 'user' command
fn handle_user(orchestrator: &RecommendationOrchestrator, user_id: UserId) {
    let titles = orchestrator.collaborative().titles();
    let ratings = orchestrator.collaborative().history().get_user_ratings(user_id);

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    if ratings.is_empty() {
        println!("{}No ratings (cold-start user)", "• ".green());
        return;
    }

    let avg_rating = ratings.iter().map(|r| r.rating).sum::<f32>() / ratings.len() as f32;
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let mut top_rated: Vec<_> = ratings.iter().collect();
    top_rated.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    println!("Top rated movies:");
    for rating in top_rated.iter().take(5) {
        let title = titles.title(rating.movie_id).unwrap_or("<unknown>");
        println!("  - {} (Rating: {})", title, rating.rating);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(orchestrator: &RecommendationOrchestrator, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let users = orchestrator.collaborative().history().users().to_vec();
    let titles: Vec<String> = orchestrator
        .content()
        .index()
        .records()
        .iter()
        .map(|r| r.title.clone())
        .collect();
    if users.is_empty() || titles.is_empty() {
        bail!("Benchmark needs at least one user and one catalog title");
    }

    // Random (title, user) pairs, one hybrid request each
    let queries: Vec<HybridQuery> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| {
                let title = titles.choose(&mut rng)?;
                let user_id = users.choose(&mut rng).copied();
                Some(HybridQuery {
                    user_id,
                    ..HybridQuery::new(title.clone())
                })
            })
            .collect()
    };

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for query in queries {
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.hybrid_recommend(query).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let sum: Duration = timings.iter().sum();
    let avg_latency = sum / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() - 1) as f32 * p) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {}", requests);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print a collaborative recommendation list
fn print_recommendations(user_id: UserId, recommendations: &[MovieRecommendation]) {
    let header = match recommendations.first() {
        Some(rec) if rec.cold_start => format!("Popular movies (user {} has no ratings):", user_id),
        _ => format!("Recommendations for user {}:", user_id),
    };
    println!("{}", header.bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {:.2}",
            (i + 1).to_string().green(),
            rec.title,
            rec.movie_id,
            rec.score
        );
    }
}

/// Print a hybrid recommendation list
fn print_fused(title: &str, fused: &[FusedScore], explain: bool) {
    println!("{}", format!("Because you liked '{}':", title).bold().blue());
    for (i, rec) in fused.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.2}",
            (i + 1).to_string().green(),
            rec.title,
            rec.score
        );
        if explain {
            println!(
                "   content rank score {}, collaborative rank score {}",
                rec.content_score, rec.collaborative_score
            );
        }
    }
}

/// Print a content similarity list
fn print_similar(title: &str, similar: &[SimilarMovie]) {
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    for (i, movie) in similar.iter().enumerate() {
        println!(
            "{}. {} (similarity: {:.3})",
            (i + 1).to_string().green(),
            movie.title,
            movie.similarity
        );
    }
}
