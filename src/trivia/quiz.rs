use rand::seq::SliceRandom;
use rand::Rng;

use super::models::Question;

/// Uniformly pick a question the player has not seen yet.
pub fn pick_question<'a, R>(
    pool: &'a [Question],
    previous_questions: &[i64],
    rng: &mut R,
) -> Option<&'a Question>
where
    R: Rng + ?Sized,
{
    let unseen: Vec<&Question> = pool
        .iter()
        .filter(|q| !previous_questions.contains(&q.id))
        .collect();
    unseen.choose(rng).copied()
}
