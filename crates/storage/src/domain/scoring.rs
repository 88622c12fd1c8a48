use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

/// Share of the final score contributed by the general audience.
pub const MORTAL_WEIGHT: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
/// Share of the final score contributed by the jury.
pub const JURY_WEIGHT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Score sums an entry's final score is derived from.
///
/// `*_self` fields only cover votes on the entry being scored, `*_sum`
/// fields cover every vote in the entry's competition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct VoteTally {
    pub mortal_self: i64,
    pub jury_self: i64,
    pub mortal_sum: i64,
    pub jury_sum: i64,
}

/// A single vote as seen by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRecord {
    pub entry_id: Uuid,
    pub score: i16,
    pub jury: bool,
}

impl VoteTally {
    /// Tally the votes of one competition for `entry_id`.
    pub fn for_entry(entry_id: Uuid, competition_votes: &[VoteRecord]) -> Self {
        competition_votes
            .iter()
            .fold(Self::default(), |mut tally, vote| {
                let score = i64::from(vote.score);
                let is_self = vote.entry_id == entry_id;
                match (vote.jury, is_self) {
                    (true, true) => {
                        tally.jury_sum += score;
                        tally.jury_self += score;
                    }
                    (true, false) => tally.jury_sum += score,
                    (false, true) => {
                        tally.mortal_sum += score;
                        tally.mortal_self += score;
                    }
                    (false, false) => tally.mortal_sum += score,
                }
                tally
            })
    }
}

/// Blend mortal and jury votes into one integer score.
///
/// Jury votes are scaled so that the whole jury pool weighs
/// `JURY_WEIGHT / MORTAL_WEIGHT` of the whole mortal pool, then the sum is
/// rounded half-up.
pub fn votesum(tally: &VoteTally) -> i32 {
    let mortal_score = Decimal::from(tally.mortal_self);

    let jury_score = if tally.jury_sum > 0 {
        let mortal_sum = Decimal::from(tally.mortal_sum);
        let jury_sum = Decimal::from(tally.jury_sum);
        Decimal::from(tally.jury_self) * ((mortal_sum / MORTAL_WEIGHT) * JURY_WEIGHT) / jury_sum
    } else {
        Decimal::ZERO
    };

    let rounded = (jury_score + mortal_score + Decimal::new(5, 1)).floor();
    rounded.to_i32().unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(entry_id: Uuid, score: i16, jury: bool) -> VoteRecord {
        VoteRecord {
            entry_id,
            score,
            jury,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_eq!(MORTAL_WEIGHT + JURY_WEIGHT, Decimal::ONE);
        assert_eq!(MORTAL_WEIGHT.to_string(), "0.7");
    }

    #[test]
    fn test_no_votes_scores_zero() {
        let entry = Uuid::new_v4();
        let tally = VoteTally::for_entry(entry, &[]);
        assert_eq!(tally, VoteTally::default());
        assert_eq!(votesum(&tally), 0);
    }

    #[test]
    fn test_single_mortal_vote() {
        let entry = Uuid::new_v4();
        let tally = VoteTally::for_entry(entry, &[vote(entry, 5, false)]);
        assert_eq!(votesum(&tally), 5);
    }

    #[test]
    fn test_jury_blending() {
        let tally = VoteTally {
            mortal_self: 5,
            jury_self: 4,
            mortal_sum: 10,
            jury_sum: 4,
        };
        // 4 * ((10 / 0.7) * 0.3) / 4 = 4.2857..., 5 + 4.2857 + 0.5 floors to 9
        assert_eq!(votesum(&tally), 9);
    }

    #[test]
    fn test_tally_from_records() {
        let entry = Uuid::new_v4();
        let other = Uuid::new_v4();
        let votes = [
            vote(entry, 5, false),
            vote(other, 3, false),
            vote(other, 2, false),
            vote(entry, 4, true),
        ];

        let tally = VoteTally::for_entry(entry, &votes);
        assert_eq!(
            tally,
            VoteTally {
                mortal_self: 5,
                jury_self: 4,
                mortal_sum: 10,
                jury_sum: 4,
            }
        );
        assert_eq!(votesum(&tally), 9);
        assert_eq!(votesum(&VoteTally::for_entry(other, &votes)), 5);
    }

    #[test]
    fn test_jury_only_votes_without_mortal_pool_score_zero() {
        let entry = Uuid::new_v4();
        let tally = VoteTally::for_entry(entry, &[vote(entry, 5, true), vote(entry, 3, true)]);
        assert_eq!(votesum(&tally), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        // jury share: 1 * ((7 / 0.7) * 0.3) / 2 = 1.5
        let tally = VoteTally {
            mortal_self: 0,
            jury_self: 1,
            mortal_sum: 7,
            jury_sum: 2,
        };
        assert_eq!(votesum(&tally), 2);
    }

    #[test]
    fn test_adding_a_vote_never_lowers_the_score() {
        let entry = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut votes = vec![
            vote(other, 4, false),
            vote(other, 2, true),
            vote(entry, 1, true),
        ];

        let mut previous = votesum(&VoteTally::for_entry(entry, &votes));
        for (score, jury) in [(3, false), (5, true), (1, false), (4, true), (2, false)] {
            votes.push(vote(entry, score, jury));
            let current = votesum(&VoteTally::for_entry(entry, &votes));
            assert!(
                current >= previous,
                "score dropped from {previous} to {current} after adding {score} (jury: {jury})"
            );
            previous = current;
        }
    }
}
