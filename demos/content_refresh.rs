//! Content Refresh Example
//!
//! Replays a sequence of fetches against a content cache and prints what each
//! one changed.

use std::io::{self, Write};

use anyhow::Result;
use jiff::{SignedDuration, Timestamp};
use mandir::prelude::{ContentCache, ContentDomain, ContentRecord};
use tracing_subscriber::EnvFilter;

/// Content Refresh Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let start = Timestamp::now();
    let at = |minutes: i64| start.checked_add(SignedDuration::from_mins(minutes));

    let mut cache = ContentCache::new(ContentDomain::Events, SignedDuration::from_mins(30));

    let fetches = [
        (
            0,
            vec![
                ContentRecord::new("diwali", at(-600)?).with_field("title", "Diwali"),
                ContentRecord::new("holi", at(-600)?).with_field("title", "Holi"),
            ],
        ),
        (45, Vec::new()),
        (
            50,
            vec![
                ContentRecord::new("diwali", at(40)?).with_field("title", "Diwali Mela"),
                ContentRecord::new("navratri", at(41)?).with_field("title", "Navratri"),
            ],
        ),
    ];

    let mut out = io::stdout().lock();

    for (minute, fresh) in fetches {
        let now = at(minute)?;

        if !cache.needs_refresh(now) {
            writeln!(out, "+{minute}m: fresh, skipping fetch")?;
            continue;
        }

        let outcome = cache.refresh(fresh, now);
        let ids: Vec<&str> = cache.items().iter().map(|item| item.id.as_str()).collect();

        writeln!(out, "+{minute}m: {outcome:?} -> {ids:?}")?;
    }

    Ok(())
}
