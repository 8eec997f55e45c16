//! Parsers for the serving artifacts.
//!
//! All files use the MovieLens `::` field separator:
//! - catalog.dat: movieId::title::year::genres::director  (genres comma-separated)
//! - movies.dat: movieId::title::genres                   (genres pipe-separated)
//! - ratings.dat: userId::movieId::rating::timestamp

use crate::error::{DataLoadError, Result};
use crate::title::clean_title;
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::{FromStr, Split};

/// Read a file with ISO-8859-1 encoding (Latin-1)
///
/// The MovieLens dataset uses ISO-8859-1 encoding, not UTF-8. Each byte maps
/// directly to a Unicode code point, so the conversion never fails.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Pull the next `::` field off a line, or report which one was missing
fn next_field<'a>(
    parts: &mut Split<'a, &str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

/// Parse a numeric field, keeping the file/line context on failure
fn parse_field<T>(value: &str, file: &str, line: usize, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

/// Parse the content metadata catalog
///
/// Format: movieId::title::year::genres::director
///
/// `year` may be empty. Genres are comma-separated: "Action, Sci-Fi".
/// Rows are returned as-is; dropping incomplete or duplicate rows is the
/// feature index's job.
pub fn parse_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let file = path.display().to_string();
    let lines = read_lines_latin1(path)?;
    let mut entries = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.split("::");
        let movie_id = next_field(&mut parts, &file, line_no, "movieId")?;
        let title = next_field(&mut parts, &file, line_no, "title")?;
        let year = next_field(&mut parts, &file, line_no, "year")?;
        let genres = next_field(&mut parts, &file, line_no, "genres")?;
        let director = next_field(&mut parts, &file, line_no, "director")?;

        let year = if year.trim().is_empty() {
            None
        } else {
            Some(parse_field(year, &file, line_no, "year")?)
        };

        entries.push(CatalogEntry {
            id: parse_field(movie_id, &file, line_no, "movieId")?,
            title: title.trim().to_string(),
            year,
            genres: split_list(genres, ','),
            director: director.trim().to_string(),
        });
    }

    Ok(entries)
}

/// Parse the movies.dat file
///
/// Format: movieId::title::genres
///
/// The raw title carries the year in parentheses and may have its article
/// moved to the end ("Godfather, The (1972)"); the cleaned form is stored
/// as the display title.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = path.display().to_string();
    let lines = read_lines_latin1(path)?;
    let mut movies = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.split("::");
        let movie_id = next_field(&mut parts, &file, line_no, "movieId")?;
        let raw_title = next_field(&mut parts, &file, line_no, "title")?;
        let genres = next_field(&mut parts, &file, line_no, "genres")?;

        let (title, year) = clean_title(raw_title);
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: "Empty title".to_string(),
            });
        }

        movies.push(Movie {
            id: parse_field(movie_id, &file, line_no, "movieId")?,
            title,
            raw_title: raw_title.trim().to_string(),
            year,
            genres: split_list(genres, '|'),
        });
    }
    Ok(movies)
}

/// Parse the ratings.dat file
///
/// Format: userId::movieId::rating::timestamp
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = path.display().to_string();
    let lines = read_lines_latin1(path)?;
    let mut ratings = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.split("::");
        let user_id = next_field(&mut parts, &file, line_no, "userId")?;
        let movie_id = next_field(&mut parts, &file, line_no, "movieId")?;
        let rating_value = next_field(&mut parts, &file, line_no, "rating")?;
        let timestamp = next_field(&mut parts, &file, line_no, "timestamp")?;

        let rating: f32 = parse_field(rating_value, &file, line_no, "rating")?;
        if !rating.is_finite() {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: rating_value.to_string(),
            });
        }

        ratings.push(Rating {
            user_id: parse_field(user_id, &file, line_no, "userId")?,
            movie_id: parse_field(movie_id, &file, line_no, "movieId")?,
            rating,
            timestamp: parse_field(timestamp, &file, line_no, "timestamp")?,
        });
    }
    Ok(ratings)
}

/// Split a delimited list, trimming items and dropping empty ones
///
/// Example: "Action, Sci-Fi" -> ["Action", "Sci-Fi"]
fn split_list(s: &str, separator: char) -> Vec<String> {
    s.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
