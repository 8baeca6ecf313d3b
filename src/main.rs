use anyhow::{anyhow, bail, Context, Result};
use ratingscope::{
    config::{Config, CONFIG_PATH_VAR},
    query::{SortKey, YearPredicate},
    record::columns,
    state::{Action, AppState},
    upload::{self, FileHandle},
    Record,
};
use serde_json::json;
use std::{collections::BTreeSet, env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: ratingscope [--config <path>] <ratings.csv> \
[--year <Y>] [--search <q>] [--genre <G>]... [--rating <R>]... [--director <q>] \
[--min-year <Y>] [--max-year <Y>] [--sort <key>]";

/// What the user asked to see after the file is loaded.
#[derive(Debug, Default)]
struct Request {
    config: Option<PathBuf>,
    file: Option<PathBuf>,
    year: Option<String>,
    search: Option<String>,
    genres: BTreeSet<String>,
    ratings: BTreeSet<String>,
    director: Option<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    sort: Option<SortKey>,
}

fn next_value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{} needs a value\n{}", flag, USAGE))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Request> {
    let mut req = Request::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => req.config = Some(PathBuf::from(next_value(&mut args, &arg)?)),
            "--year" => req.year = Some(next_value(&mut args, &arg)?),
            "--search" => req.search = Some(next_value(&mut args, &arg)?),
            "--genre" => {
                req.genres.insert(next_value(&mut args, &arg)?);
            }
            "--rating" => {
                req.ratings.insert(next_value(&mut args, &arg)?);
            }
            "--director" => req.director = Some(next_value(&mut args, &arg)?),
            "--min-year" => {
                req.min_year = Some(next_value(&mut args, &arg)?.parse().context("--min-year")?)
            }
            "--max-year" => {
                req.max_year = Some(next_value(&mut args, &arg)?.parse().context("--max-year")?)
            }
            "--sort" => req.sort = Some(next_value(&mut args, &arg)?.parse()?),
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            other if req.file.is_none() => req.file = Some(PathBuf::from(other)),
            other => bail!("unexpected argument {}\n{}", other, USAGE),
        }
    }
    Ok(req)
}

fn summarize(records: &[&Record]) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|r| {
            json!({
                "const": r.id(),
                "title": r.title(),
                "year": r.year(),
                "rating": r.rating(),
                "url": r.url(),
                "imdb_rating": r.field(columns::IMDB_RATING),
                "runtime": r.field(columns::RUNTIME),
                "num_votes": r.field(columns::NUM_VOTES),
                "release_date": r.field(columns::RELEASE_DATE),
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) args + config ────────────────────────────────────────────
    let req = parse_args(env::args().skip(1))?;
    let config_path = req
        .config
        .clone()
        .or_else(|| env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from));
    let config = Config::load(config_path.as_deref())?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    info!(?config, "startup");

    // ─── 3) upload ───────────────────────────────────────────────────
    let path = req.file.clone().ok_or_else(|| anyhow!(USAGE))?;
    let mut state = AppState::new(config.default_filter());
    state = state.apply(Action::UploadStarted(FileHandle::from_path(&path)));

    if let Some(id) = state.pending_upload() {
        let file = FileHandle::from_path(&path);
        let result = upload::read_text(&file).await;
        state = state.apply(Action::ReadFinished { id, result });
    }
    if let Some(err) = &state.error {
        bail!("{}: {}", path.display(), err);
    }

    // ─── 4) criteria ─────────────────────────────────────────────────
    let mut filter = state.filter.clone();
    filter.genres = req.genres.clone();
    filter.ratings = req.ratings.clone();
    filter.director = req.director.clone().unwrap_or_default();
    filter.year = YearPredicate::Range {
        min: req.min_year,
        max: req.max_year,
    };
    if let Some(sort) = req.sort {
        filter.sort = sort;
    }
    state = state.apply(Action::SetFilter(filter));
    if let Some(q) = &req.search {
        state = state.apply(Action::SetSearch(q.clone()));
    }
    if let Some(year) = &req.year {
        state = state.apply(Action::SelectYear(year.clone()));
    }

    // ─── 5) emit views ───────────────────────────────────────────────
    let mut out = json!({
        "file": path.display().to_string(),
        "records": state.records().len(),
        "chart": state.chart(),
        "facets": state.facet_options(),
        "list": summarize(&state.listing()),
    });
    if req.search.is_some() {
        out["search"] = json!(summarize(&state.search_results()));
    }
    if let Some(detail) = state.year_detail() {
        out["year_detail"] = json!(detail);
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
