// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Output formatting helpers for nourish-cli
// ABOUTME: JSON printing and a human-readable replay summary on stderr

use anyhow::Result;
use nourish_engine::replay::ReplayReport;
use serde::Serialize;

/// Print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Summarize a replay on stderr so stdout stays machine-readable
pub fn display_replay_summary(report: &ReplayReport) {
    eprintln!("\nReplay Summary");
    eprintln!("{}", "=".repeat(72));
    eprintln!("   Events replayed: {}", report.events_replayed);
    eprintln!(
        "   Evaluated at:    {}",
        report.evaluated_at.format("%Y-%m-%d %H:%M UTC")
    );
    for user in &report.users {
        eprintln!("\n   User {}", user.user_id);
        eprintln!(
            "      events: {}  confidence: {:.2} ({:?})",
            user.events, user.profile.confidence, user.profile.confidence_band
        );
        if let Some((cuisine, weight)) = user.profile.top_cuisine() {
            eprintln!("      top cuisine: {cuisine} ({weight:.2})");
        }
        eprintln!(
            "      challenges: {} generated, {} completed, {} active, {} points",
            user.generated.len(),
            user.completed,
            user.active.len(),
            user.points_awarded
        );
        for progress in &user.active {
            eprintln!(
                "         - {} [{}] {:.0}/{:.0} {} ({:.0}%)",
                progress.definition.title,
                progress.definition.dimension,
                progress.current_value,
                progress.definition.target_value,
                progress.definition.unit,
                progress.completion_percentage
            );
        }
    }
    eprintln!("{}", "=".repeat(72));
}
