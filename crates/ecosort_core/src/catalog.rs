//! Static reference data: the reward catalog and the leaderboard rivals.

use crate::Reward;

struct RewardEntry {
    id: &'static str,
    title: &'static str,
    cost: u64,
    emoji: &'static str,
    description: &'static str,
}

const REWARDS: &[RewardEntry] = &[
    RewardEntry {
        id: "1",
        title: "Free Coffee",
        cost: 500,
        emoji: "☕",
        description: "One regular coffee at the campus canteen",
    },
    RewardEntry {
        id: "2",
        title: "10% Book Discount",
        cost: 800,
        emoji: "📚",
        description: "Discount on textbooks",
    },
    RewardEntry {
        id: "3",
        title: "Plant a Tree",
        cost: 2000,
        emoji: "🌳",
        description: "A tree planted in your name",
    },
    RewardEntry {
        id: "4",
        title: "Bus Ticket",
        cost: 300,
        emoji: "🚌",
        description: "Single ride on the campus bus",
    },
];

const RIVALS: &[(&str, u64)] = &[
    ("Siti Aminah", 2450),
    ("Budi Santoso", 980),
    ("Rina Wijaya", 850),
    ("Ahmad Dani", 720),
];

pub fn rewards() -> Vec<Reward> {
    REWARDS.iter().map(to_reward).collect()
}

pub fn find_reward(id: &str) -> Option<Reward> {
    REWARDS.iter().find(|entry| entry.id == id).map(to_reward)
}

fn to_reward(entry: &RewardEntry) -> Reward {
    Reward {
        id: entry.id.to_string(),
        title: entry.title.to_string(),
        cost: entry.cost,
        description: entry.description.to_string(),
        emoji: entry.emoji.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub points: u64,
    pub is_current_user: bool,
}

/// Rivals plus the signed-in user, highest points first. Ties keep listing order.
pub fn leaderboard(user_name: &str, user_points: u64) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(String, u64, bool)> = Vec::with_capacity(RIVALS.len() + 1);
    rows.push((RIVALS[0].0.to_string(), RIVALS[0].1, false));
    rows.push((user_name.to_string(), user_points, true));
    rows.extend(
        RIVALS[1..]
            .iter()
            .map(|(name, points)| (name.to_string(), *points, false)),
    );
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    rows.into_iter()
        .enumerate()
        .map(|(idx, (name, points, is_current_user))| LeaderboardEntry {
            rank: idx + 1,
            name,
            points,
            is_current_user,
        })
        .collect()
}

/// Community goal shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityTarget {
    pub kilograms_sorted: u32,
    pub progress_percent: u8,
}

pub const COMMUNITY_TARGET: CommunityTarget = CommunityTarget {
    kilograms_sorted: 8_450,
    progress_percent: 75,
};
