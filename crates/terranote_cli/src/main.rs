//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `terranote_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use terranote_core::db::open_db_in_memory;
use terranote_core::{CommentStore, SqliteDocumentStorage};

fn main() {
    println!("terranote_core version={}", terranote_core::core_version());

    match open_db_in_memory() {
        Ok(conn) => match SqliteDocumentStorage::try_new(&conn) {
            Ok(storage) => {
                let store = CommentStore::open(storage);
                let stats = store.get_stats();
                println!(
                    "store scenes={} comments={} schema_version={}",
                    stats.scene_count, stats.comment_count, stats.version
                );
            }
            Err(err) => eprintln!("storage bootstrap failed: {err}"),
        },
        Err(err) => eprintln!("db open failed: {err}"),
    }
}
