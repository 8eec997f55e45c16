use data_loader::{MovieIdTitleMap, RatingHistory};
use std::path::Path;
use std::time::Instant;

fn main() -> data_loader::Result<()> {
    let data_dir = Path::new("data");

    println!("Loading serving artifacts...\n");

    let start = Instant::now();
    let (titles, history) = rayon::join(
        || MovieIdTitleMap::load(&data_dir.join("movies.dat")),
        || RatingHistory::load(&data_dir.join("ratings.dat")),
    );
    let (titles, history) = (titles?, history?);
    let elapsed = start.elapsed();

    let (users, rated_movies, ratings) = history.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Catalog movies: {}", titles.len());
    println!("Users: {}", users);
    println!("Rated movies: {}", rated_movies);
    println!("Ratings: {}", ratings);
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / elapsed.as_secs_f64());
    Ok(())
}
