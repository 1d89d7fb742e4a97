//! Team composition: role-constrained and fully random ("chaos") squads.
//!
//! Both builders are pure: they read the roster views and draw from the
//! caller's RNG stream, nothing else.

use crate::{
    error::{BotError, BotResult},
    rng::BotRng,
    roster::{Role, RoleIndex},
};

/// Squad size for a chaos team.
pub const TEAM_SIZE: usize = 5;

/// Chaos positions, in output order.
pub const POSITIONS: [Role; TEAM_SIZE] = [
    Role::Baron,
    Role::Dragon,
    Role::Mid,
    Role::Jungle,
    Role::Support,
];

pub const BUILDS: [&str; 3] = ["AD", "AP", "Tank"];

/// One entry per role in the index, labelled `"<role> <entry>"`, then shuffled.
///
/// Each role draws independently, so one entry can land in two roles.
/// That is the intended behaviour, not a collision bug.
pub fn make_team(index: &RoleIndex, rng: &mut BotRng) -> BotResult<Vec<String>> {
    let mut team = Vec::with_capacity(index.len());
    for (role, eligible) in index {
        let entry = rng
            .choose(eligible)
            .ok_or_else(|| BotError::EmptyRole { role: role.to_string() })?;
        team.push(format!("{role} {entry}"));
    }
    rng.shuffle(&mut team);
    Ok(team)
}

/// Five distinct entries, each with a random build, in fixed position order.
pub fn make_chaos(entries: &[String], rng: &mut BotRng) -> BotResult<Vec<String>> {
    let mut distinct: Vec<&String> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !distinct.contains(&entry) {
            distinct.push(entry);
        }
    }
    let drawn = rng
        .sample(&distinct, TEAM_SIZE)
        .ok_or(BotError::InsufficientRoster {
            needed:    TEAM_SIZE,
            available: distinct.len(),
        })?;
    let builds: Vec<&str> = POSITIONS
        .iter()
        .filter_map(|_| rng.choose(&BUILDS).copied())
        .collect();

    Ok(drawn
        .into_iter()
        .zip(POSITIONS.iter())
        .zip(builds)
        .map(|((entry, position), build)| format!("{build} {position} {entry}"))
        .collect())
}

/// Two squads as a quoted "Side A" / "Side B" block.
pub fn render_sides<F>(mut make: F) -> BotResult<String>
where
    F: FnMut() -> BotResult<Vec<String>>,
{
    let mut response = String::new();
    for side in ["A", "B"] {
        let squad = make()?.join("\n> ");
        response.push_str(&format!("Side {side}\n> {squad}\n"));
    }
    Ok(response.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::BotRng;

    fn full_index() -> RoleIndex {
        let mut index = RoleIndex::new();
        index.insert(Role::Mid, vec!["Aurelion Sol".into(), "Orianna".into()]);
        index.insert(Role::Baron, vec!["Darius".into(), "Riven".into()]);
        index.insert(Role::Support, vec!["Janna".into(), "Senna".into()]);
        index.insert(Role::Jungle, vec!["Evelynn".into(), "Rengar".into()]);
        index.insert(Role::Dragon, vec!["Lucian".into(), "Jinx".into()]);
        index
    }

    #[test]
    fn team_covers_each_role_once() {
        let index = full_index();
        let mut rng = BotRng::new(1, 0);
        for _ in 0..50 {
            let team = make_team(&index, &mut rng).unwrap();
            assert_eq!(team.len(), 5);
            let mut roles: Vec<&str> = team
                .iter()
                .map(|label| label.split_once(' ').unwrap().0)
                .collect();
            roles.sort_unstable();
            assert_eq!(roles, vec!["Baron", "Dragon", "Jungle", "Mid", "Support"]);
        }
    }

    #[test]
    fn empty_role_is_reported() {
        let mut index = full_index();
        index.insert(Role::Jungle, vec![]);
        let mut rng = BotRng::new(1, 0);
        match make_team(&index, &mut rng) {
            Err(BotError::EmptyRole { role }) => assert_eq!(role, "Jungle"),
            other => panic!("expected EmptyRole, got {other:?}"),
        }
    }

    #[test]
    fn chaos_dedups_before_counting() {
        let entries: Vec<String> =
            ["A", "A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut rng = BotRng::new(1, 1);
        match make_chaos(&entries, &mut rng) {
            Err(BotError::InsufficientRoster { needed, available }) => {
                assert_eq!((needed, available), (5, 4));
            }
            other => panic!("expected InsufficientRoster, got {other:?}"),
        }
    }

    #[test]
    fn chaos_builds_come_from_the_build_list() {
        let entries: Vec<String> =
            ["A", "B", "C", "D", "E", "F"].iter().map(|s| s.to_string()).collect();
        let mut rng = BotRng::new(9, 1);
        let mut seen = Vec::new();
        for _ in 0..60 {
            let squad = make_chaos(&entries, &mut rng).unwrap();
            assert_eq!(squad.len(), TEAM_SIZE);
            for label in &squad {
                let build = label.split_once(' ').unwrap().0;
                assert!(BUILDS.contains(&build), "unknown build in {label}");
                seen.push(build.to_string());
            }
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec!["AD", "AP", "Tank"]);
    }

    #[test]
    fn sides_render_two_blocks() {
        let mut n = 0;
        let text = render_sides(|| {
            n += 1;
            Ok(vec![format!("x{n}"), format!("y{n}")])
        })
        .unwrap();
        assert_eq!(text, "Side A\n> x1\n> y1\nSide B\n> x2\n> y2");
    }
}
