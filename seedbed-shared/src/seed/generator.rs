/// Synthetic record generation
///
/// Pure functions over a caller-supplied RNG, so a seeded `StdRng` yields the
/// same records on every run.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use seedbed_shared::seed::generator::{generate_tasks, generate_users};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let users = generate_users(&mut rng, 3);
/// assert_eq!(users.len(), 3);
///
/// let tasks = generate_tasks(&mut rng, 5, &[1, 2, 3], &[10, 11, 12]).unwrap();
/// assert!(tasks.iter().all(|t| [1, 2, 3].contains(&t.status_id)));
/// ```

use super::words::{EMAIL_DOMAINS, FIRST_NAMES, LAST_NAMES, WORDS};
use crate::error::{StoreError, StoreResult};
use crate::models::{NewTask, NewUser};
use rand::Rng;
use std::collections::HashSet;

/// Column width of `users.fullname`, `users.email` and `tasks.title`
pub const MAX_FIELD_CHARS: usize = 100;

/// Upper bound on generated task descriptions
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Generates `count` users with random names and batch-unique emails
pub fn generate_users<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<NewUser> {
    let mut seen = HashSet::with_capacity(count);
    let mut users = Vec::with_capacity(count);

    while users.len() < count {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);
        let email = email_for(rng, first, last);

        // 32 random bits per address; a collision just draws again
        if !seen.insert(email.clone()) {
            continue;
        }

        users.push(NewUser {
            fullname: truncate_chars(&format!("{} {}", first, last), MAX_FIELD_CHARS),
            email,
        });
    }

    users
}

/// Generates `count` tasks assigned uniformly over the given statuses and users
///
/// Each task gets a short sentence as title and, with probability 1/2, a
/// paragraph as description.
///
/// # Errors
///
/// Returns `StoreError::PreconditionFailed` if `status_ids` is empty, or if
/// `user_ids` is empty while `count > 0`.
pub fn generate_tasks<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    status_ids: &[i32],
    user_ids: &[i32],
) -> StoreResult<Vec<NewTask>> {
    if status_ids.is_empty() {
        return Err(StoreError::PreconditionFailed(
            "'status' table is empty, run create-tables first".to_string(),
        ));
    }
    if count > 0 && user_ids.is_empty() {
        return Err(StoreError::PreconditionFailed(
            "no users to assign tasks to".to_string(),
        ));
    }

    let tasks = (0..count)
        .map(|_| {
            let title = truncate_chars(&sentence(rng, 4..=8), MAX_FIELD_CHARS);
            let description = if rng.gen_bool(0.5) {
                Some(paragraph(rng, MAX_DESCRIPTION_CHARS))
            } else {
                None
            };

            NewTask {
                title,
                description,
                status_id: *pick(rng, status_ids),
                user_id: *pick(rng, user_ids),
            }
        })
        .collect();

    Ok(tasks)
}

/// Builds a lowercase `first.last.xxxxxxxx@domain` address
fn email_for<R: Rng + ?Sized>(rng: &mut R, first: &str, last: &str) -> String {
    let email = format!(
        "{}.{}.{:08x}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.gen::<u32>(),
        pick(rng, EMAIL_DOMAINS)
    );
    truncate_chars(&email, MAX_FIELD_CHARS)
}

/// Random capitalized sentence ending with a period
fn sentence<R: Rng + ?Sized>(rng: &mut R, words: std::ops::RangeInclusive<usize>) -> String {
    let n = rng.gen_range(words);
    let mut text = (0..n)
        .map(|_| *pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(first) = text.get(..1) {
        text = format!("{}{}", first.to_uppercase(), &text[1..]);
    }
    text.push('.');
    text
}

/// Sentences joined by spaces, at most `max_chars` long
fn paragraph<R: Rng + ?Sized>(rng: &mut R, max_chars: usize) -> String {
    let mut text = sentence(rng, 5..=12);

    loop {
        let next = sentence(rng, 5..=12);
        if text.chars().count() + 1 + next.chars().count() > max_chars {
            break;
        }
        text.push(' ');
        text.push_str(&next);
    }

    truncate_chars(&text, max_chars)
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    // Callers only pass non-empty slices
    &items[rng.gen_range(0..items.len())]
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_users_count_and_unique_emails() {
        let mut rng = StdRng::seed_from_u64(1);
        let users = generate_users(&mut rng, 200);

        assert_eq!(users.len(), 200);
        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 200);
    }

    #[test]
    fn test_generated_users_fit_columns() {
        let mut rng = StdRng::seed_from_u64(2);
        for user in generate_users(&mut rng, 50) {
            assert!(!user.fullname.is_empty());
            assert!(user.fullname.chars().count() <= MAX_FIELD_CHARS);
            assert!(user.email.chars().count() <= MAX_FIELD_CHARS);
            assert!(user.email.contains('@'));
            assert_eq!(user.email, user.email.to_lowercase());
        }
    }

    #[test]
    fn test_generate_zero_users() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_users(&mut rng, 0).is_empty());
    }

    #[test]
    fn test_generation_is_deterministic_for_seed() {
        let a = generate_users(&mut StdRng::seed_from_u64(42), 10);
        let b = generate_users(&mut StdRng::seed_from_u64(42), 10);
        assert_eq!(a, b);

        let ta = generate_tasks(&mut StdRng::seed_from_u64(42), 10, &[1, 2], &[5, 6]).unwrap();
        let tb = generate_tasks(&mut StdRng::seed_from_u64(42), 10, &[1, 2], &[5, 6]).unwrap();
        assert_eq!(ta, tb);
    }

    #[test]
    fn test_tasks_reference_given_ids() {
        let mut rng = StdRng::seed_from_u64(4);
        let status_ids = [1, 2, 3];
        let user_ids = [11, 12, 13, 14];

        let tasks = generate_tasks(&mut rng, 300, &status_ids, &user_ids).unwrap();

        assert_eq!(tasks.len(), 300);
        for task in &tasks {
            assert!(status_ids.contains(&task.status_id));
            assert!(user_ids.contains(&task.user_id));
        }

        // Uniform choice over 300 draws hits every id
        for id in status_ids {
            assert!(tasks.iter().any(|t| t.status_id == id));
        }
        for id in user_ids {
            assert!(tasks.iter().any(|t| t.user_id == id));
        }
    }

    #[test]
    fn test_task_fields_fit_columns() {
        let mut rng = StdRng::seed_from_u64(5);
        let tasks = generate_tasks(&mut rng, 100, &[1], &[1]).unwrap();

        for task in &tasks {
            assert!(!task.title.is_empty());
            assert!(task.title.ends_with('.'));
            assert!(task.title.chars().count() <= MAX_FIELD_CHARS);
            if let Some(description) = &task.description {
                assert!(!description.is_empty());
                assert!(description.chars().count() <= MAX_DESCRIPTION_CHARS);
            }
        }

        // Description is optional on roughly half the tasks
        let with_description = tasks.iter().filter(|t| t.description.is_some()).count();
        assert!(with_description > 0 && with_description < 100);
    }

    #[test]
    fn test_tasks_require_statuses() {
        let mut rng = StdRng::seed_from_u64(6);
        let result = generate_tasks(&mut rng, 30, &[], &[1, 2]);
        assert!(matches!(result, Err(StoreError::PreconditionFailed(_))));
    }

    #[test]
    fn test_tasks_require_users() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = generate_tasks(&mut rng, 30, &[1, 2, 3], &[]);
        assert!(matches!(result, Err(StoreError::PreconditionFailed(_))));

        // Nothing to assign, nothing required
        let tasks = generate_tasks(&mut rng, 0, &[1, 2, 3], &[]).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_sentence_is_capitalized() {
        let mut rng = StdRng::seed_from_u64(8);
        let text = sentence(&mut rng, 3..=3);
        assert!(text.chars().next().unwrap().is_uppercase());
        assert_eq!(text.split(' ').count(), 3);
    }
}
