// src/genres.rs

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Language genre names are displayed and filtered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreLocale {
    #[default]
    En,
    Es,
}

impl FromStr for GenreLocale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(GenreLocale::En),
            "es" => Ok(GenreLocale::Es),
            other => Err(anyhow::anyhow!("unknown genre locale {:?}", other)),
        }
    }
}

/// English export names → Spanish display names.
static ES_GENRES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Action", "Acción"),
        ("Adult", "Adulto"),
        ("Adventure", "Aventura"),
        ("Animation", "Animación"),
        ("Biography", "Biografía"),
        ("Comedy", "Comedia"),
        ("Crime", "Crimen"),
        ("Documentary", "Documental"),
        ("Drama", "Drama"),
        ("Family", "Familia"),
        ("Fantasy", "Fantasía"),
        ("Film-Noir", "Cine negro"),
        ("Game-Show", "Concurso"),
        ("History", "Historia"),
        ("Horror", "Terror"),
        ("Music", "Música"),
        ("Musical", "Musical"),
        ("Mystery", "Misterio"),
        ("News", "Noticias"),
        ("Reality-TV", "Telerrealidad"),
        ("Romance", "Romance"),
        ("Sci-Fi", "Ciencia ficción"),
        ("Short", "Cortometraje"),
        ("Sport", "Deporte"),
        ("Talk-Show", "Programa de entrevistas"),
        ("Thriller", "Suspense"),
        ("War", "Bélica"),
        ("Western", "Western"),
    ])
});

/// Translate one genre name; names missing from the table pass through.
pub fn localize(genre: &str, locale: GenreLocale) -> &str {
    match locale {
        GenreLocale::En => genre,
        GenreLocale::Es => ES_GENRES.get(genre).copied().unwrap_or(genre),
    }
}
