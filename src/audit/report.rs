//! Plain-text report rendering.
//!
//! Links use Slack's `<url|label>` syntax since the report is posted there.

use super::accumulator::RunAccumulator;

const WINNER_SUFFIX: &str = " (winner)";

/// Renders the run totals as a report.
///
/// Sections, in order: unanswered mentions per user, participation per user,
/// then pull request authors who never commented. The first two sections are
/// always terminated by a blank line; the last is omitted when empty.
pub fn render_report(acc: &RunAccumulator) -> String {
    let mut text = String::new();

    for line in unanswered_lines(acc) {
        text.push_str(&line);
        text.push('\n');
    }
    text.push('\n');

    for line in participation_lines(acc) {
        text.push_str(&line);
        text.push('\n');
    }
    text.push('\n');

    if let Some(line) = silent_authors_line(acc) {
        text.push_str(&line);
        text.push('\n');
    }

    text
}

fn unanswered_lines(acc: &RunAccumulator) -> Vec<String> {
    let mut users: Vec<(&str, &Vec<String>)> = acc
        .unanswered_by_user()
        .iter()
        .filter(|(_, locations)| !locations.is_empty())
        .map(|(user_id, locations)| (user_id.as_str(), locations))
        .collect();
    users.sort_by(|(a, _), (b, _)| by_name(acc, a, b));

    users
        .into_iter()
        .map(|(user_id, locations)| {
            let links = locations
                .iter()
                .enumerate()
                .map(|(index, location)| format!("<{location}|{}>", index + 1))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} has {} unanswered {}: {links}",
                acc.display_name(user_id),
                locations.len(),
                plural(locations.len(), "comment", "comments"),
            )
        })
        .collect()
}

fn participation_lines(acc: &RunAccumulator) -> Vec<String> {
    let counts = acc.participation_count();
    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };

    let mut users: Vec<(&str, usize)> = counts
        .iter()
        .map(|(user_id, count)| (user_id.as_str(), *count))
        .collect();
    users.sort_by(|(a, a_count), (b, b_count)| {
        b_count.cmp(a_count).then_with(|| by_name(acc, a, b))
    });

    users
        .into_iter()
        .map(|(user_id, count)| {
            let suffix = if count == max { WINNER_SUFFIX } else { "" };
            format!(
                "{} took part in conversations on {count} {}{suffix}",
                acc.display_name(user_id),
                plural(count, "pull request", "pull requests"),
            )
        })
        .collect()
}

fn silent_authors_line(acc: &RunAccumulator) -> Option<String> {
    let mut authors: Vec<&str> = acc.non_commenting_authors().collect();
    if authors.is_empty() {
        return None;
    }
    authors.sort_by(|a, b| by_name(acc, a, b));

    let names: Vec<&str> = authors
        .into_iter()
        .map(|user_id| acc.display_name(user_id))
        .collect();
    Some(format!(
        "Pull request authors who never commented: {}",
        names.join(", ")
    ))
}

fn by_name(acc: &RunAccumulator, a: &str, b: &str) -> std::cmp::Ordering {
    acc.display_name(a)
        .cmp(acc.display_name(b))
        .then_with(|| a.cmp(b))
}

fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
