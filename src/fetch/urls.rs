// src/fetch/urls.rs
use tracing::debug;
use url::Url;

/// Which endpoint shape a candidate URL targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// The published `/pub?...&output=csv` export.
    Primary,
    /// The query-based `/gviz/tq?tqx=out:csv` export of the same sheet.
    Fallback,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Primary => "primary",
            CandidateKind::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub url: String,
}

/// Replace the first `key` parameter in place (dropping any repeats), or append it.
fn set_query_param(u: &mut Url, key: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (k, v) in u.query_pairs().into_owned() {
        if k == key {
            if !replaced {
                pairs.push((k, value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((k, v));
        }
    }
    if !replaced {
        pairs.push((key.to_string(), value.to_string()));
    }
    u.query_pairs_mut().clear().extend_pairs(pairs);
}

fn remove_query_params(u: &mut Url, keys: &[&str]) {
    let pairs: Vec<(String, String)> = u
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .collect();
    if pairs.is_empty() {
        u.set_query(None);
    } else {
        u.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// Add `cachebust=<ts>` so intermediate HTTP caches see a fresh URL.
/// Unparseable input comes back unchanged.
pub fn add_cache_bust(url: &str, ts: i64) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            set_query_param(&mut u, "cachebust", &ts.to_string());
            u.to_string()
        }
        Err(e) => {
            debug!(url, error = %e, "cannot cache-bust; using URL as-is");
            url.to_string()
        }
    }
}

/// `/spreadsheets/d/e/<id>/pub?gid=N&single=true&output=csv`
/// → `/spreadsheets/d/e/<id>/gviz/tq?gid=N&tqx=out:csv`.
/// Unparseable input comes back unchanged.
pub fn to_gviz_csv_url(url: &str) -> String {
    let mut u = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            debug!(url, error = %e, "cannot derive gviz URL; using URL as-is");
            return url.to_string();
        }
    };
    if let Some(prefix) = u.path().strip_suffix("/pub").map(str::to_string) {
        u.set_path(&format!("{}/gviz/tq", prefix));
    }
    remove_query_params(&mut u, &["output", "single"]);
    set_query_param(&mut u, "tqx", "out:csv");
    u.to_string()
}

/// Ordered fetch candidates for one configured base URL: primary first.
pub fn candidate_urls(base: &str, ts: i64) -> Vec<Candidate> {
    vec![
        Candidate {
            kind: CandidateKind::Primary,
            url: add_cache_bust(base, ts),
        },
        Candidate {
            kind: CandidateKind::Fallback,
            url: add_cache_bust(&to_gviz_csv_url(base), ts),
        },
    ]
}
