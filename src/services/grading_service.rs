use crate::models::question::Question;

pub const DEFAULT_WEAK_TAG_LIMIT: usize = 3;

pub struct GradingService;

impl GradingService {
    /// Counts answers that match their question's correct letter exactly.
    ///
    /// Questions and answers are paired by position; a question that could not
    /// be loaded, or one without a submitted answer, earns nothing.
    pub fn score(questions: &[Option<Question>], answers: &[String]) -> i64 {
        questions
            .iter()
            .zip(answers.iter())
            .filter_map(|(q, a)| q.as_ref().map(|q| (q, a)))
            .filter(|(q, a)| q.is_correct(a))
            .count() as i64
    }

    /// Concept tags ranked by how many of their questions were missed.
    ///
    /// Ties keep the order in which the tags were first missed. Tags with no
    /// misses never appear.
    pub fn weak_tags(
        questions: &[Option<Question>],
        answers: &[String],
        limit: usize,
    ) -> Vec<String> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for (question, answer) in questions.iter().zip(answers.iter()) {
            let Some(question) = question else {
                continue;
            };
            if question.is_correct(answer) {
                continue;
            }
            let tag = question.concept_tag.as_str();
            match counts.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag, 1)),
            }
        }

        // sort_by is stable, so equal counts stay in encounter order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(limit)
            .map(|(tag, _)| tag.to_string())
            .collect()
    }
}
