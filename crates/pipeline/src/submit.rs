//! Submits one organization, retrying while the platform rate limits.
//!
//! Every response lands in one of four terminal states: created,
//! conflict (422), rate limit exhausted (429 on the last allowed attempt)
//! or failed (anything else). Only 429 is retried, after the cooldown
//! given by the [`RetryPolicy`].

use orgmigrate_core::RetryPolicy;
use orgmigrate_identity::{CreatedOrganization, IdentityApiError, NewOrganization, OrganizationApi};

/// Terminal state of one submission.
#[derive(Debug)]
pub enum Submission {
    Created(CreatedOrganization),
    Conflict(IdentityApiError),
    RateLimitExhausted(IdentityApiError),
    Failed(IdentityApiError),
}

/// A [`Submission`] together with how many requests it took.
#[derive(Debug)]
pub struct SubmitReport {
    pub attempts: u32,
    pub submission: Submission,
}

/// Create `organization`, sleeping and resubmitting on every rate-limit
/// response until the policy's attempt budget is spent.
pub async fn submit_with_retry<A>(
    api: &A,
    organization: &NewOrganization,
    policy: &RetryPolicy,
) -> SubmitReport
where
    A: OrganizationApi + ?Sized,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let submission = match api.create_organization(organization).await {
            Ok(created) => Submission::Created(created),
            Err(e) if e.is_conflict() => Submission::Conflict(e),
            Err(e) if e.is_rate_limited() => match policy.delay_after(attempt) {
                Some(delay) => {
                    tracing::warn!(
                        name = %organization.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, cooling down before retry",
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                None => Submission::RateLimitExhausted(e),
            },
            Err(e) => Submission::Failed(e),
        };

        return SubmitReport {
            attempts: attempt,
            submission,
        };
    }
}
