//! Candidate Generator
//!
//! Enumerates single-leg and vertical-spread candidates for one underlying.
//!
//! ## Search space
//! 1. Rows are normalized once and grouped by expiry (ascending date).
//! 2. Only expiries whose DTE falls in a configured tenor band survive
//!    (weekly 7-14, monthly 21-45, quarterly 60-90 by default).
//! 3. Each side keeps strikes within `max(min_moneyness_pct, expected_move_pct)`
//!    percent of spot, the nearest `strikes_per_side` by distance, re-sorted
//!    ascending by strike.
//! 4. Per expiry: ATM CALL, ATM PUT, then every adjacent strike pair at widths
//!    `1..=max_width` on the call side (bull call debit, bear call credit) and
//!    the put side (bear put debit, bull put credit).
//!
//! ## Bounded emission
//! Candidates are pushed into a per-bucket emitter that stops the walk as soon
//! as `max_per_bucket` is reached, so memory is bounded by the cap rather than
//! by the size of the chain.
//!
//! Pure: no clock reads (the caller supplies `as_of`), no I/O.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::leg::{Leg, OptionType, Side};
use crate::raw::RawContractRow;
use crate::types::{Candidate, Premium, StrategyType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenor {
    Weekly,
    Monthly,
    Quarterly,
}

/// Inclusive DTE range mapped to a tenor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TenorBand {
    pub tenor: Tenor,
    pub min_dte: i64,
    pub max_dte: i64,
}

impl TenorBand {
    pub fn contains(&self, dte: i64) -> bool {
        (self.min_dte..=self.max_dte).contains(&dte)
    }
}

/// Bounds on the generator's search space.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub tenor_bands: Vec<TenorBand>,
    /// Floor for the strike window, in percent of spot.
    pub min_moneyness_pct: f64,
    pub strikes_per_side: usize,
    pub max_spread_width: usize,
    pub max_per_bucket: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tenor_bands: vec![
                TenorBand {
                    tenor: Tenor::Weekly,
                    min_dte: 7,
                    max_dte: 14,
                },
                TenorBand {
                    tenor: Tenor::Monthly,
                    min_dte: 21,
                    max_dte: 45,
                },
                TenorBand {
                    tenor: Tenor::Quarterly,
                    min_dte: 60,
                    max_dte: 90,
                },
            ],
            min_moneyness_pct: 0.8,
            strikes_per_side: 6,
            max_spread_width: 5,
            max_per_bucket: 24,
        }
    }
}

impl GeneratorConfig {
    pub fn tenor_for(&self, dte: i64) -> Option<Tenor> {
        self.tenor_bands
            .iter()
            .find(|b| b.contains(dte))
            .map(|b| b.tenor)
    }
}

/// Calls and puts of one surviving expiry, strike-filtered and sorted
/// ascending by strike.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpiryBucket {
    pub expiry: NaiveDate,
    pub dte: i64,
    pub tenor: Tenor,
    pub calls: Vec<Leg>,
    pub puts: Vec<Leg>,
}

/// Everything the generator needs about one underlying.
#[derive(Clone, Copy, Debug)]
pub struct ChainSnapshot<'a> {
    pub underlying: &'a str,
    pub spot: f64,
    pub expected_move_pct: f64,
    pub as_of: NaiveDate,
    pub rows: &'a [RawContractRow],
}

impl<'a> ChainSnapshot<'a> {
    /// Expected move in price units.
    pub fn expected_move(&self) -> f64 {
        self.spot * self.expected_move_pct / 100.0
    }

    /// Normalize, group and filter rows into per-expiry buckets.
    ///
    /// Returns an empty list (never an error) when nothing survives.
    pub fn buckets(&self, cfg: &GeneratorConfig) -> Vec<ExpiryBucket> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            debug!(
                underlying = self.underlying,
                spot = self.spot,
                "non-positive spot; no buckets"
            );
            return Vec::new();
        }

        let mut by_expiry: BTreeMap<NaiveDate, (Vec<Leg>, Vec<Leg>)> = BTreeMap::new();
        let mut dropped = 0usize;

        for row in self.rows {
            let Some(leg) = Leg::from_raw(row, Side::Long) else {
                dropped += 1;
                continue;
            };

            let entry = by_expiry.entry(leg.expiry).or_default();
            match leg.option_type {
                OptionType::Call => entry.0.push(leg),
                OptionType::Put => entry.1.push(leg),
            }
        }

        if dropped > 0 {
            debug!(
                underlying = self.underlying,
                dropped,
                "rows without contract identity skipped"
            );
        }

        let band_pct = cfg.min_moneyness_pct.max(self.expected_move_pct);
        let mut out = Vec::new();

        for (expiry, (calls, puts)) in by_expiry {
            let dte = (expiry - self.as_of).num_days();

            let Some(tenor) = cfg.tenor_for(dte) else {
                trace!(underlying = self.underlying, %expiry, dte, "expiry outside tenor bands");
                continue;
            };

            let calls = nearest_strikes(calls, self.spot, band_pct, cfg.strikes_per_side);
            let puts = nearest_strikes(puts, self.spot, band_pct, cfg.strikes_per_side);

            if calls.is_empty() && puts.is_empty() {
                debug!(underlying = self.underlying, %expiry, "no strikes within moneyness band");
                continue;
            }

            out.push(ExpiryBucket {
                expiry,
                dte,
                tenor,
                calls,
                puts,
            });
        }

        out
    }

    /// Emit candidates for one bucket, capped at `cfg.max_per_bucket`.
    ///
    /// `only` keeps the structures built from one side of the chain. It is
    /// applied after the capped walk, so the filtered list is always a subset
    /// of the unfiltered one.
    pub fn candidates_for(
        &self,
        bucket: &ExpiryBucket,
        cfg: &GeneratorConfig,
        only: Option<OptionType>,
    ) -> Vec<Candidate> {
        let mut out = self.walk_bucket(bucket, cfg);
        if let Some(side) = only {
            out.retain(|c| c.strategy_type.option_type() == side);
        }
        out
    }

    fn walk_bucket(&self, bucket: &ExpiryBucket, cfg: &GeneratorConfig) -> Vec<Candidate> {
        let build = Builder {
            snapshot: self,
            bucket,
        };
        let mut emitter = BucketEmitter::new(cfg.max_per_bucket);

        for (kind, legs) in [
            (StrategyType::Call, &bucket.calls),
            (StrategyType::Put, &bucket.puts),
        ] {
            if let Some(leg) = atm(legs, self.spot)
                && !emitter.offer(Some(build.long_single(kind, leg)))
            {
                return emitter.finish();
            }
        }

        let max_width = cfg
            .max_spread_width
            .min(bucket.calls.len().saturating_sub(1))
            .min(bucket.puts.len().saturating_sub(1));

        'widths: for w in 1..=max_width {
            for pair in bucket.calls.windows(w + 1) {
                let (lower, upper) = (&pair[0], &pair[w]);
                if !emitter.offer(build.bull_call_debit(lower, upper))
                    || !emitter.offer(build.bear_call_credit(lower, upper))
                {
                    break 'widths;
                }
            }

            for pair in bucket.puts.windows(w + 1) {
                let (lower, upper) = (&pair[0], &pair[w]);
                if !emitter.offer(build.bear_put_debit(lower, upper))
                    || !emitter.offer(build.bull_put_credit(lower, upper))
                {
                    break 'widths;
                }
            }
        }

        emitter.finish()
    }

    /// All candidates for this underlying, buckets in ascending expiry order.
    #[instrument(
        target = "generator",
        skip(self, cfg),
        fields(underlying = self.underlying, rows = self.rows.len())
    )]
    pub fn generate(&self, cfg: &GeneratorConfig, only: Option<OptionType>) -> Vec<Candidate> {
        let out: Vec<Candidate> = self
            .buckets(cfg)
            .iter()
            .flat_map(|b| self.candidates_for(b, cfg, only))
            .collect();

        debug!(candidates = out.len(), "candidates generated");
        out
    }
}

/// Keep strikes inside the band, nearest `keep` by distance, ascending by
/// strike. Duplicate strikes keep the first row seen.
fn nearest_strikes(mut legs: Vec<Leg>, spot: f64, band_pct: f64, keep: usize) -> Vec<Leg> {
    let max_distance = spot * band_pct / 100.0;
    legs.retain(|l| (l.strike - spot).abs() <= max_distance);

    legs.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    legs.dedup_by(|a, b| a.strike == b.strike);

    let dist = |l: &Leg| (l.strike - spot).abs();
    legs.sort_by(|a, b| dist(a).total_cmp(&dist(b)).then(a.strike.total_cmp(&b.strike)));
    legs.truncate(keep);

    legs.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    legs
}

/// Strike minimizing |strike - spot|; ties go to the lower strike.
fn atm(legs: &[Leg], spot: f64) -> Option<&Leg> {
    legs.iter()
        .min_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()))
}

/// Per-bucket sink that refuses candidates past the cap.
struct BucketEmitter {
    out: Vec<Candidate>,
    cap: usize,
}

impl BucketEmitter {
    fn new(cap: usize) -> Self {
        Self {
            out: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Push a candidate if there is room. Returns whether more may follow.
    fn offer(&mut self, candidate: Option<Candidate>) -> bool {
        if self.out.len() >= self.cap {
            return false;
        }
        if let Some(c) = candidate {
            self.out.push(c);
        }
        self.out.len() < self.cap
    }

    fn finish(self) -> Vec<Candidate> {
        if self.out.len() >= self.cap {
            trace!(cap = self.cap, "bucket cap reached");
        }
        self.out
    }
}

/// Shapes candidate economics for one bucket.
struct Builder<'s, 'a> {
    snapshot: &'s ChainSnapshot<'a>,
    bucket: &'s ExpiryBucket,
}

impl Builder<'_, '_> {
    fn candidate(
        &self,
        strategy_type: StrategyType,
        legs: Vec<Leg>,
        premium: Premium,
        max_gain: f64,
        max_loss: f64,
        breakeven: f64,
    ) -> Candidate {
        Candidate {
            strategy_type,
            underlying: self.snapshot.underlying.to_string(),
            spot: self.snapshot.spot,
            expiry: self.bucket.expiry,
            dte: self.bucket.dte,
            tenor: self.bucket.tenor,
            legs,
            premium,
            max_gain: max_gain.max(0.0),
            max_loss: max_loss.max(0.0),
            breakeven,
            expected_move_pct: self.snapshot.expected_move_pct,
        }
    }

    /// Long CALL or PUT. `max_gain` is the payoff at the expected-move target.
    fn long_single(&self, strategy_type: StrategyType, leg: &Leg) -> Candidate {
        let spot = self.snapshot.spot;
        let em = self.snapshot.expected_move();
        let premium = leg.mid;

        let (breakeven, intrinsic_at_target) = match strategy_type {
            StrategyType::Put => (leg.strike - premium, (leg.strike - (spot - em)).max(0.0)),
            _ => (leg.strike + premium, ((spot + em) - leg.strike).max(0.0)),
        };

        self.candidate(
            strategy_type,
            vec![leg.with_side(Side::Long)],
            Premium::Debit(premium),
            intrinsic_at_target - premium,
            premium,
            breakeven,
        )
    }

    /// Long lower call / short upper call.
    fn bull_call_debit(&self, lower: &Leg, upper: &Leg) -> Option<Candidate> {
        let debit = lower.mid - upper.mid;
        if debit <= 0.0 {
            return None;
        }
        let width = upper.strike - lower.strike;

        Some(self.candidate(
            StrategyType::BullCallDebit,
            vec![lower.with_side(Side::Long), upper.with_side(Side::Short)],
            Premium::Debit(debit),
            width - debit,
            debit,
            lower.strike + debit,
        ))
    }

    /// Short lower call / long upper call.
    fn bear_call_credit(&self, lower: &Leg, upper: &Leg) -> Option<Candidate> {
        let credit = lower.mid - upper.mid;
        if credit <= 0.0 {
            return None;
        }
        let width = upper.strike - lower.strike;

        Some(self.candidate(
            StrategyType::BearCallCredit,
            vec![lower.with_side(Side::Short), upper.with_side(Side::Long)],
            Premium::Credit(credit),
            credit,
            width - credit,
            lower.strike + credit,
        ))
    }

    /// Long upper put / short lower put.
    fn bear_put_debit(&self, lower: &Leg, upper: &Leg) -> Option<Candidate> {
        let debit = upper.mid - lower.mid;
        if debit <= 0.0 {
            return None;
        }
        let width = upper.strike - lower.strike;

        Some(self.candidate(
            StrategyType::BearPutDebit,
            vec![upper.with_side(Side::Long), lower.with_side(Side::Short)],
            Premium::Debit(debit),
            width - debit,
            debit,
            upper.strike - debit,
        ))
    }

    /// Short upper put / long lower put.
    fn bull_put_credit(&self, lower: &Leg, upper: &Leg) -> Option<Candidate> {
        let credit = upper.mid - lower.mid;
        if credit <= 0.0 {
            return None;
        }
        let width = upper.strike - lower.strike;

        Some(self.candidate(
            StrategyType::BullPutCredit,
            vec![upper.with_side(Side::Short), lower.with_side(Side::Long)],
            Premium::Credit(credit),
            credit,
            width - credit,
            upper.strike - credit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn quote(expiry: &str, kind: &str, strike: f64, mid: f64) -> RawContractRow {
        serde_json::from_value(json!({
            "expiration": expiry,
            "type": kind,
            "strike": strike,
            "bid": mid - 0.02,
            "ask": mid + 0.02,
            "open_interest": 1000,
            "volume": 500
        }))
        .unwrap()
    }

    fn snapshot(rows: &[RawContractRow]) -> ChainSnapshot<'_> {
        ChainSnapshot {
            underlying: "XYZ",
            spot: 100.0,
            expected_move_pct: 3.0,
            as_of: as_of(),
            rows,
        }
    }

    fn strikes(legs: &[Leg]) -> Vec<f64> {
        legs.iter().map(|l| l.strike).collect()
    }

    #[test]
    fn tenor_bands_match_cadences() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.tenor_for(6), None);
        assert_eq!(cfg.tenor_for(7), Some(Tenor::Weekly));
        assert_eq!(cfg.tenor_for(14), Some(Tenor::Weekly));
        assert_eq!(cfg.tenor_for(15), None);
        assert_eq!(cfg.tenor_for(21), Some(Tenor::Monthly));
        assert_eq!(cfg.tenor_for(45), Some(Tenor::Monthly));
        assert_eq!(cfg.tenor_for(50), None);
        assert_eq!(cfg.tenor_for(60), Some(Tenor::Quarterly));
        assert_eq!(cfg.tenor_for(90), Some(Tenor::Quarterly));
        assert_eq!(cfg.tenor_for(91), None);
    }

    #[test]
    fn expiries_outside_bands_are_dropped() {
        // 2025-01-16 is 10 DTE, 2025-01-24 is 18 DTE
        let rows = vec![
            quote("2025-01-16", "call", 100.0, 1.5),
            quote("2025-01-24", "call", 100.0, 2.0),
        ];
        let buckets = snapshot(&rows).buckets(&GeneratorConfig::default());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].dte, 10);
        assert_eq!(buckets[0].tenor, Tenor::Weekly);
    }

    #[test]
    fn strike_window_uses_expected_move_with_floor() {
        let rows: Vec<_> = [94.0, 96.0, 97.0, 99.0, 100.0, 101.0, 103.0, 104.0]
            .iter()
            .map(|k| quote("2025-01-16", "call", *k, 1.0))
            .collect();

        let wide = snapshot(&rows).buckets(&GeneratorConfig::default());
        assert_eq!(strikes(&wide[0].calls), vec![97.0, 99.0, 100.0, 101.0, 103.0]);

        let mut tight_snapshot = snapshot(&rows);
        tight_snapshot.expected_move_pct = 0.1;
        let tight = tight_snapshot.buckets(&GeneratorConfig::default());
        // floor of 0.8% keeps only 100
        assert_eq!(strikes(&tight[0].calls), vec![100.0]);
    }

    #[test]
    fn nearest_six_per_side_are_kept() {
        let rows: Vec<_> = (0..12)
            .map(|i| quote("2025-01-16", "put", 95.0 + i as f64, 1.0))
            .collect();
        let mut snap = snapshot(&rows);
        snap.expected_move_pct = 10.0;

        let buckets = snap.buckets(&GeneratorConfig::default());
        assert_eq!(
            strikes(&buckets[0].puts),
            vec![97.0, 98.0, 99.0, 100.0, 101.0, 102.0]
        );
    }

    #[test]
    fn duplicate_strikes_keep_first_row() {
        let rows = vec![
            quote("2025-01-16", "call", 100.0, 1.5),
            quote("2025-01-16", "call", 100.0, 9.9),
        ];
        let buckets = snapshot(&rows).buckets(&GeneratorConfig::default());

        assert_eq!(buckets[0].calls.len(), 1);
        assert!((buckets[0].calls[0].mid - 1.5).abs() < 1e-12);
    }

    #[test]
    fn expiry_with_no_strikes_in_band_is_skipped() {
        let rows = vec![quote("2025-01-16", "call", 150.0, 0.1)];
        assert!(snapshot(&rows).buckets(&GeneratorConfig::default()).is_empty());
    }

    #[test]
    fn non_positive_spot_yields_nothing() {
        let rows = vec![quote("2025-01-16", "call", 100.0, 1.5)];
        let mut snap = snapshot(&rows);
        snap.spot = 0.0;
        assert!(snap.generate(&GeneratorConfig::default(), None).is_empty());
        snap.spot = f64::NAN;
        assert!(snap.generate(&GeneratorConfig::default(), None).is_empty());
    }

    #[test]
    fn atm_ties_break_low() {
        let rows = vec![
            quote("2025-01-16", "call", 99.0, 2.0),
            quote("2025-01-16", "call", 101.0, 1.0),
        ];
        let buckets = snapshot(&rows).buckets(&GeneratorConfig::default());
        assert_eq!(atm(&buckets[0].calls, 100.0).unwrap().strike, 99.0);
    }

    #[test]
    fn bull_call_debit_economics() {
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "put", 98.0, 0.9),
            quote("2025-01-16", "put", 100.0, 1.8),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);
        let c = out
            .iter()
            .find(|c| c.strategy_type == StrategyType::BullCallDebit)
            .unwrap();

        assert!((c.debit().unwrap() - 1.2).abs() < 1e-9);
        assert!((c.max_loss - 1.2).abs() < 1e-9);
        assert!((c.max_gain - 0.8).abs() < 1e-9);
        assert!((c.breakeven - 99.2).abs() < 1e-9);
        assert_eq!(c.long_leg().unwrap().strike, 98.0);
        assert_eq!(c.short_leg().unwrap().strike, 100.0);
    }

    #[test]
    fn credit_spreads_mirror_debit_spreads() {
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "put", 98.0, 0.9),
            quote("2025-01-16", "put", 100.0, 1.8),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);

        let bcc = out
            .iter()
            .find(|c| c.strategy_type == StrategyType::BearCallCredit)
            .unwrap();
        assert!((bcc.credit().unwrap() - 1.2).abs() < 1e-9);
        assert!((bcc.max_gain - 1.2).abs() < 1e-9);
        assert!((bcc.max_loss - 0.8).abs() < 1e-9);
        assert!((bcc.breakeven - 99.2).abs() < 1e-9);
        assert_eq!(bcc.short_leg().unwrap().strike, 98.0);

        let bpd = out
            .iter()
            .find(|c| c.strategy_type == StrategyType::BearPutDebit)
            .unwrap();
        assert!((bpd.debit().unwrap() - 0.9).abs() < 1e-9);
        assert!((bpd.breakeven - 99.1).abs() < 1e-9);
        assert_eq!(bpd.long_leg().unwrap().strike, 100.0);

        let bpc = out
            .iter()
            .find(|c| c.strategy_type == StrategyType::BullPutCredit)
            .unwrap();
        assert!((bpc.credit().unwrap() - 0.9).abs() < 1e-9);
        assert!((bpc.max_loss - 1.1).abs() < 1e-9);
        assert_eq!(bpc.short_leg().unwrap().strike, 100.0);
    }

    #[test]
    fn inverted_prices_produce_no_spread() {
        // upper call priced above lower call: no positive debit, no positive credit
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 1.0),
            quote("2025-01-16", "call", 100.0, 1.0),
            quote("2025-01-16", "put", 98.0, 1.0),
            quote("2025-01-16", "put", 100.0, 1.0),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.legs.len() == 1));
    }

    #[test]
    fn single_leg_gain_is_payoff_at_expected_move() {
        let rows = vec![quote("2025-01-16", "call", 100.0, 1.0)];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);

        assert_eq!(out.len(), 1);
        let call = &out[0];
        assert_eq!(call.strategy_type, StrategyType::Call);
        // spot + 3% = 103 -> intrinsic 3, minus premium 1
        assert!((call.max_gain - 2.0).abs() < 1e-9);
        assert!((call.max_loss - 1.0).abs() < 1e-9);
        assert!((call.breakeven - 101.0).abs() < 1e-9);
    }

    #[test]
    fn bucket_cap_stops_emission() {
        let rows: Vec<_> = (0..6)
            .flat_map(|i| {
                let k = 97.0 + i as f64;
                [
                    quote("2025-01-16", "call", k, 10.0 - i as f64),
                    quote("2025-01-16", "put", k, 1.0 + i as f64),
                ]
            })
            .collect();

        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);
        assert_eq!(out.len(), 24);

        let cfg = GeneratorConfig {
            max_per_bucket: 3,
            ..GeneratorConfig::default()
        };
        let capped = snapshot(&rows).generate(&cfg, None);
        assert_eq!(capped.len(), 3);
        assert_eq!(capped[0].strategy_type, StrategyType::Call);
        assert_eq!(capped[1].strategy_type, StrategyType::Put);
        assert_eq!(capped[2].strategy_type, StrategyType::BullCallDebit);
    }

    #[test]
    fn contract_type_filter_restricts_families() {
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "put", 98.0, 0.9),
            quote("2025-01-16", "put", 100.0, 1.8),
        ];
        let calls_only =
            snapshot(&rows).generate(&GeneratorConfig::default(), Some(OptionType::Call));

        assert!(!calls_only.is_empty());
        assert!(
            calls_only
                .iter()
                .all(|c| c.strategy_type.option_type() == OptionType::Call)
        );
    }

    #[test]
    fn spreads_need_two_strikes_on_both_sides() {
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "put", 100.0, 1.8),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);
        assert!(out.iter().all(|c| c.legs.len() == 1));
    }

    fn span(c: &Candidate) -> (f64, f64) {
        let lo = c.legs.iter().map(|l| l.strike).fold(f64::INFINITY, f64::min);
        let hi = c.legs.iter().map(|l| l.strike).fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    }

    /// Identity of a candidate without the NaN-bearing greeks.
    fn keys(out: &[Candidate]) -> Vec<(StrategyType, (f64, f64), f64)> {
        out.iter()
            .map(|c| (c.strategy_type, span(c), c.premium.amount()))
            .collect()
    }

    fn one_side(out: &[Candidate], side: OptionType) -> Vec<(StrategyType, (f64, f64), f64)> {
        let kept: Vec<Candidate> = out
            .iter()
            .filter(|c| c.strategy_type.option_type() == side)
            .cloned()
            .collect();
        keys(&kept)
    }

    #[test]
    fn side_filter_never_adds_candidates() {
        // three calls but a single put: no verticals on either side
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "call", 102.0, 0.9),
            quote("2025-01-16", "put", 100.0, 1.8),
        ];
        let cfg = GeneratorConfig::default();
        let all = snapshot(&rows).generate(&cfg, None);
        let calls = snapshot(&rows).generate(&cfg, Some(OptionType::Call));
        let puts = snapshot(&rows).generate(&cfg, Some(OptionType::Put));

        assert_eq!(keys(&calls), one_side(&all, OptionType::Call));
        assert_eq!(keys(&puts), one_side(&all, OptionType::Put));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].strategy_type, StrategyType::Call);
    }

    #[test]
    fn side_filter_applies_after_the_bucket_cap() {
        let rows: Vec<_> = (0..6)
            .flat_map(|i| {
                let k = 97.0 + i as f64;
                [
                    quote("2025-01-16", "call", k, 10.0 - i as f64),
                    quote("2025-01-16", "put", k, 1.0 + i as f64),
                ]
            })
            .collect();
        let cfg = GeneratorConfig::default();

        let all = snapshot(&rows).generate(&cfg, None);
        assert_eq!(all.len(), 24);

        let puts = snapshot(&rows).generate(&cfg, Some(OptionType::Put));
        assert_eq!(keys(&puts), one_side(&all, OptionType::Put));
    }

    #[test]
    fn wide_verticals_price_off_the_outer_strikes() {
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "call", 102.0, 0.9),
            quote("2025-01-16", "put", 98.0, 0.9),
            quote("2025-01-16", "put", 100.0, 1.8),
            quote("2025-01-16", "put", 102.0, 3.0),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);
        let find = |kind: StrategyType| {
            out.iter()
                .find(|c| c.strategy_type == kind && span(c) == (98.0, 102.0))
                .unwrap()
        };

        let bcd = find(StrategyType::BullCallDebit);
        assert_eq!(bcd.long_leg().unwrap().strike, 98.0);
        assert_eq!(bcd.short_leg().unwrap().strike, 102.0);
        assert!((bcd.debit().unwrap() - 2.1).abs() < 1e-9);
        assert!((bcd.max_loss - 2.1).abs() < 1e-9);
        assert!((bcd.max_gain - 1.9).abs() < 1e-9);
        assert!((bcd.breakeven - 100.1).abs() < 1e-9);

        let bpc = find(StrategyType::BullPutCredit);
        assert_eq!(bpc.short_leg().unwrap().strike, 102.0);
        assert_eq!(bpc.long_leg().unwrap().strike, 98.0);
        assert!((bpc.credit().unwrap() - 2.1).abs() < 1e-9);
        assert!((bpc.max_gain - 2.1).abs() < 1e-9);
        assert!((bpc.max_loss - 1.9).abs() < 1e-9);
        assert!((bpc.breakeven - 99.9).abs() < 1e-9);
    }

    #[test]
    fn width_bound_follows_the_shorter_side() {
        // four calls, three puts: widths stop at 2 on both sides
        let rows = vec![
            quote("2025-01-16", "call", 98.0, 3.0),
            quote("2025-01-16", "call", 99.0, 2.4),
            quote("2025-01-16", "call", 100.0, 1.8),
            quote("2025-01-16", "call", 101.0, 1.3),
            quote("2025-01-16", "put", 99.0, 1.4),
            quote("2025-01-16", "put", 100.0, 1.8),
            quote("2025-01-16", "put", 101.0, 2.3),
        ];
        let out = snapshot(&rows).generate(&GeneratorConfig::default(), None);

        let widths: Vec<f64> = out
            .iter()
            .filter(|c| c.legs.len() == 2)
            .map(|c| {
                let (lo, hi) = span(c);
                hi - lo
            })
            .collect();

        assert_eq!(widths.iter().cloned().fold(0.0, f64::max), 2.0);
        assert!(!out.iter().any(|c| span(c) == (98.0, 101.0)));
        // 2 singles, width 1: 3 call + 2 put pairs, width 2: 2 call + 1 put pair
        assert_eq!(out.len(), 2 + 2 * (3 + 2) + 2 * (2 + 1));
    }
}
