//! Penalty scoring and the migration protocol that moves [`Link`]s between
//! [`Node`]s on connect/disconnect.
//!
//! [`Link`]: crate::link::Link

pub mod penalty {
    //! The scalar load score used to rank nodes.

    use crate::node::stats::NodeStats;

    /// Compute a node's penalty score from its latest stats snapshot and
    /// availability.
    ///
    /// An unavailable node, or one that hasn't sent a `stats` frame yet,
    /// scores `+∞` so it's never selected over a node we actually know
    /// something about.
    pub fn calculate(stats: Option<&NodeStats>, available: bool) -> f64 {
        let Some(stats) = stats.filter(|_| available) else {
            return f64::INFINITY;
        };

        let player_penalty = stats.playing_players as f64;
        let cpu_penalty = 1.05f64.powf(100.0 * stats.system_load) * 10.0 - 10.0;

        let (deficit_frame_penalty, null_frame_penalty) = if stats.avg_frame_deficit != -1 {
            let deficit = 1.03f64.powf(500.0 * stats.avg_frame_deficit as f64 / 3000.0) * 600.0 - 600.0;
            let nulled =
                (1.03f64.powf(500.0 * stats.avg_frame_nulled as f64 / 3000.0) * 300.0 - 300.0) * 2.0;

            (deficit, nulled)
        } else {
            (0.0, 0.0)
        };

        player_penalty + cpu_penalty + deficit_frame_penalty + null_frame_penalty
    }

    #[cfg(test)]
    mod tests {
        use super::calculate;
        use crate::node::stats::NodeStats;

        fn stats(playing_players: u64, system_load: f64) -> NodeStats {
            NodeStats {
                playing_players,
                system_load,
                avg_frame_sent: -1,
                avg_frame_nulled: -1,
                avg_frame_deficit: -1,
                ..NodeStats::default()
            }
        }

        #[test]
        fn unavailable_is_infinite() {
            assert_eq!(calculate(Some(&stats(0, 0.0)), false), f64::INFINITY);
            assert_eq!(calculate(None, true), f64::INFINITY);
        }

        #[test]
        fn player_count_dominates_when_idle() {
            let light = calculate(Some(&stats(3, 0.0)), true);
            let heavy = calculate(Some(&stats(5, 0.0)), true);
            assert!(light < heavy);
        }

        #[test]
        fn cpu_penalty_can_flip_the_ordering() {
            let light_but_hot = calculate(Some(&stats(3, 0.9)), true);
            let heavy_but_cool = calculate(Some(&stats(5, 0.0)), true);
            assert!(heavy_but_cool < light_but_hot);
        }

        #[test]
        fn frame_penalties_are_skipped_when_absent() {
            let mut with_deficit = stats(1, 0.0);
            with_deficit.avg_frame_deficit = 0;
            with_deficit.avg_frame_nulled = 0;

            assert_eq!(
                calculate(Some(&stats(1, 0.0)), true),
                calculate(Some(&with_deficit), true)
            );
        }
    }
}

use crate::{client::Client, error::NoNodesAvailable, node::Node};

/// Iterate every registered node, returning the one with the lowest penalty.
///
/// Fails if the registry is empty or if the winner isn't currently
/// `available` (which also covers the all-unavailable case, since every
/// unavailable node scores `+∞`).
pub(crate) async fn determine_best_node(client: &Client) -> Result<Node, NoNodesAvailable> {
    let best = client
        .nodes()
        .into_iter()
        .min_by(|a, b| a.penalty().partial_cmp(&b.penalty()).expect("penalty is never NaN"));

    match best {
        Some(node) if node.is_available() => Ok(node),
        _ => Err(NoNodesAvailable),
    }
}

/// Called when a node finishes its handshake: claim every link that doesn't
/// currently have an available node.
pub(crate) async fn on_node_connect(client: &Client, node: &Node) {
    let links = client.links();

    for link in links {
        let needs_node = match link.current_node() {
            Some(current) => !current.is_available(),
            None => true,
        };

        if needs_node {
            link.change_node(node.clone()).await;
        }
    }
}

/// Called when a node's connection closes: migrate every link it was
/// servicing to the next-best node, or destroy them if none remain.
pub(crate) async fn on_node_disconnect(client: &Client, node: &Node) {
    let guild_ids = node.guild_ids();

    match determine_best_node(client).await {
        Ok(replacement) => {
            for guild_id in guild_ids {
                if let Some(link) = client.link(guild_id) {
                    link.change_node(replacement.clone()).await;
                }
            }
        }
        Err(_) => {
            tracing::warn!(
                "node `{}` disconnected with no replacement available; destroying {} link(s)",
                node.name(),
                guild_ids.len()
            );

            for guild_id in guild_ids {
                if let Some(link) = client.link(guild_id) {
                    link.destroy().await;
                }
            }
        }
    }

    node.clear_guild_ids();
}
