//! Glicko-2 rating calculations
//!
//! This module implements the exact Glicko-2 variant the ladder has always
//! used: one opponent per rating period, system constant tau = 1.2, deviation
//! capped at 200 and volatility at 0.30, with display-scale results rounded
//! once at the end (rating and deviation to one decimal, volatility to five).
//!
//! The constants are compiled in rather than configured: previously stored
//! player documents and the display front-end both assume these exact values.

use crate::error::{LadderError, Result};
use crate::types::RatingState;
use std::f64::consts::PI;

/// Conversion factor between the display scale and the internal Glicko-2 scale
pub const SCALE: f64 = 173.7178;

/// Volatility assigned to players with no stored volatility
pub const SIGMA_DEFAULT: f64 = 0.06;

/// Upper bound on volatility
pub const SIGMA_MAX: f64 = 0.30;

/// Glicko-2 system constant: constrains volatility change per rating period
pub const TAU: f64 = 1.2;

/// Convergence tolerance for the volatility solver
pub const EPSILON: f64 = 0.000001;

/// Upper bound on rating deviation
pub const RD_MAX: f64 = 200.0;

/// Players at or below this deviation are ranked (leaderboard-eligible)
pub const RANKED_DEVIATION_MAX: f64 = 100.0;

/// Iteration cap for the volatility solver; on cap the current estimate is
/// returned rather than failing
const MAX_VOLATILITY_ITERATIONS: u32 = 500;

/// One game against one opponent, from the perspective of the player
/// being updated
#[derive(Debug, Clone, Copy)]
pub struct OpponentResult {
    pub rating: f64,
    pub deviation: f64,
    /// 1.0 for a win over this opponent, 0.0 for a loss (no draws)
    pub score: f64,
}

impl OpponentResult {
    /// A win over `opponent`
    pub fn win_over(opponent: &RatingState) -> Self {
        Self {
            rating: opponent.rating,
            deviation: opponent.deviation,
            score: 1.0,
        }
    }

    /// A loss to `opponent`
    pub fn loss_to(opponent: &RatingState) -> Self {
        Self {
            rating: opponent.rating,
            deviation: opponent.deviation,
            score: 0.0,
        }
    }
}

/// Convert a display-scale (rating, deviation) pair to internal (mu, phi)
fn to_internal(rating: f64, deviation: f64) -> (f64, f64) {
    ((rating - 1500.0) / SCALE, deviation / SCALE)
}

/// Convert internal (mu, phi) back to display scale, without rounding
fn to_display(mu: f64, phi: f64) -> (f64, f64) {
    (mu * SCALE + 1500.0, phi * SCALE)
}

/// Impact-reduction factor g(phi): discounts an opponent's influence by
/// their rating uncertainty
fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// Expected score of a player at `mu` against an opponent at `(mu_j, phi_j)`,
/// on the internal scale.
///
/// Symmetric by construction: `expected_score(a, b, phi) +
/// expected_score(b, a, phi)` is exactly 1 for equal deviations.
pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// Round a display-scale value to one decimal place (the precision of all
/// stored ratings, deviations, and deltas)
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round_five_decimals(value: f64) -> f64 {
    (value * 100000.0).round() / 100000.0
}

/// Solve for the post-period volatility.
///
/// Finds the root of the Glicko-2 volatility function via Illinois-variant
/// regula falsi. If the solver has not converged after the iteration cap it
/// returns the current estimate; the bracket only narrows, so the estimate
/// degrades gracefully instead of erroring.
pub fn update_volatility(sigma: f64, phi: f64, v: f64, delta: f64) -> f64 {
    let a = (sigma * sigma).ln();
    let tau2 = TAU * TAU;
    let phi2 = phi * phi;
    let delta2 = delta * delta;

    let f = |x: f64| {
        let ex = x.exp();
        let d2 = phi2 + v + ex;
        (ex * (delta2 - phi2 - v - ex)) / (2.0 * d2 * d2) - (x - a) / tau2
    };

    let mut upper = a;
    let mut lower = if delta2 > phi2 + v {
        (delta2 - phi2 - v).ln()
    } else {
        let mut k = 1.0;
        while f(a - k * TAU) < 0.0 {
            k += 1.0;
        }
        a - k * TAU
    };

    let mut f_upper = f(upper);
    let mut f_lower = f(lower);
    let mut iterations = 0;

    while (lower - upper).abs() > EPSILON && iterations < MAX_VOLATILITY_ITERATIONS {
        let candidate = upper + (upper - lower) * f_upper / (f_lower - f_upper);
        let f_candidate = f(candidate);

        if f_candidate * f_lower <= 0.0 {
            upper = lower;
            f_upper = f_lower;
        } else {
            // Illinois step: halve the retained side to force convergence
            f_upper /= 2.0;
        }

        lower = candidate;
        f_lower = f_candidate;
        iterations += 1;
    }

    (upper / 2.0).exp()
}

/// Validate a rating state at the engine boundary.
///
/// The engine itself is pure arithmetic; malformed inputs would silently
/// produce NaN, so they are rejected here before any math runs.
fn validate_state(state: &RatingState) -> Result<()> {
    if !state.rating.is_finite() {
        return Err(LadderError::InvalidRating {
            reason: format!("rating must be finite, got {}", state.rating),
        }
        .into());
    }
    if !state.deviation.is_finite() || state.deviation < 0.0 {
        return Err(LadderError::InvalidRating {
            reason: format!("deviation must be non-negative, got {}", state.deviation),
        }
        .into());
    }
    if !state.volatility.is_finite() || state.volatility <= 0.0 {
        return Err(LadderError::InvalidRating {
            reason: format!("volatility must be positive, got {}", state.volatility),
        }
        .into());
    }
    Ok(())
}

/// Apply one rating period's results and return the player's new state.
///
/// Both players of a match must be updated from each other's *pre-match*
/// state; callers are responsible for not feeding one update's output into
/// the other.
///
/// With no results the player "did not play": deviation inflates toward
/// uncertainty (capped at [`RD_MAX`]) and rating/volatility are unchanged.
/// In this system that branch is only a defensive fallback, since every
/// submission supplies exactly one opponent.
pub fn apply_match_result(player: &RatingState, results: &[OpponentResult]) -> Result<RatingState> {
    validate_state(player)?;
    for result in results {
        validate_state(&RatingState {
            rating: result.rating,
            deviation: result.deviation,
            volatility: SIGMA_DEFAULT,
        })?;
    }

    let (mu, phi) = to_internal(player.rating, player.deviation);
    let sigma = player.volatility;

    if results.is_empty() {
        let phi_star = (phi * phi + sigma * sigma).sqrt();
        let (rating, deviation) = to_display(mu, phi_star.min(RD_MAX / SCALE));
        return Ok(RatingState {
            rating: round_one_decimal(rating),
            deviation: round_one_decimal(deviation),
            volatility: sigma,
        });
    }

    let mut v_inv = 0.0;
    let mut delta_sum = 0.0;
    for result in results {
        let (mu_j, phi_j) = to_internal(result.rating, result.deviation);
        let g_j = g(phi_j);
        let e_j = expected_score(mu, mu_j, phi_j);
        v_inv += g_j * g_j * e_j * (1.0 - e_j);
        delta_sum += g_j * (result.score - e_j);
    }

    let v = 1.0 / v_inv;
    let delta = v * delta_sum;

    let new_sigma = update_volatility(sigma, phi, v, delta);
    let phi_star = (phi * phi + new_sigma * new_sigma).sqrt();
    let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
    let mu_new = mu + phi_new * phi_new * delta_sum;

    let (rating, deviation) = to_display(mu_new, phi_new);

    Ok(RatingState {
        rating: round_one_decimal(rating),
        deviation: round_one_decimal(deviation.clamp(0.0, RD_MAX)),
        volatility: round_five_decimals(new_sigma.min(SIGMA_MAX)),
    })
}

/// Win probability of `player` over `opponent`, in [0, 1]
pub fn win_probability(player: &RatingState, opponent: &RatingState) -> f64 {
    let (mu, _) = to_internal(player.rating, player.deviation);
    let (mu_j, phi_j) = to_internal(opponent.rating, opponent.deviation);
    expected_score(mu, mu_j, phi_j)
}

/// Win probability formatted as a percentage with one decimal, e.g. "64.2"
pub fn win_probability_pct(player: &RatingState, opponent: &RatingState) -> String {
    format!("{:.1}", win_probability(player, opponent) * 100.0)
}
