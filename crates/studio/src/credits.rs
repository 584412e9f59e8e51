//! Credit and duration estimates against the speech provider's balance.

use serde::Serialize;
use speech_core::text::{char_len, duration_for_chars};
use speech_core::{clean_script, CreditBalance, SpeechSynthesizer};

use crate::error::Result;

/// What synthesizing a script would cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditEstimate {
    /// Characters of cleaned text.
    pub characters: i64,
    pub credits: i64,
    pub duration_secs: i64,
}

/// Required credits compared with the provider's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub required: i64,
    pub remaining: i64,
    pub total: i64,
    pub reset_date: Option<String>,
    pub sufficient: bool,
}

/// Estimate over the cleaned script; one credit per character.
pub fn estimate(text: &str) -> CreditEstimate {
    let characters = char_len(&clean_script(text)) as i64;
    CreditEstimate {
        characters,
        credits: characters,
        duration_secs: duration_for_chars(characters),
    }
}

/// The provider's credit balance for the current period.
pub async fn remaining_credits<S>(synth: &S) -> Result<CreditBalance>
where
    S: SpeechSynthesizer + ?Sized,
{
    Ok(synth.remaining_credits().await?)
}

/// Compare the cost of `text` with the provider's remaining credits.
pub async fn quota_status<S>(synth: &S, text: &str) -> Result<QuotaStatus>
where
    S: SpeechSynthesizer + ?Sized,
{
    let required = estimate(text).credits;
    let balance = synth.remaining_credits().await?;

    Ok(QuotaStatus {
        required,
        remaining: balance.remaining,
        total: balance.total,
        sufficient: balance.covers(required),
        reset_date: balance.reset_date,
    })
}
