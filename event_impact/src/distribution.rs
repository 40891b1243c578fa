//! Descriptive statistics and choice of the central statistic of a variable.
//!
//! The Shapiro-Wilk test follows Royston's approximation (algorithm AS R94),
//! which is valid for samples of 3 to 5000 observations. Larger samples are
//! subsampled with a fixed seed so that the outcome is reproducible.

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::config::*;
use crate::survey::SurveyRecord;

/// The p-value above which a sample is considered normal.
pub const NORMALITY_THRESHOLD: f64 = 0.05;

/// Largest sample given to the normality test.
pub const MAX_TESTED_SAMPLE: usize = 5000;

/// Seed of the subsampling of large samples.
pub const SUBSAMPLE_SEED: u64 = 123;

/// The reasons the normality test cannot produce a p-value.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum ShapiroError {
    TooFewValues,
    TooManyValues,
    ZeroRange,
}

/// Evaluates a sample in which missing values are `None`.
pub fn evaluate(sample: &[Option<f64>], mode: SelectionMode) -> VariableStatistics {
    let values: Vec<f64> = sample.iter().filter_map(|x| *x).collect();
    evaluate_values(&values, mode)
}

/// Evaluates a sample. Non-finite values are dropped.
pub fn evaluate_values(values: &[f64], mode: SelectionMode) -> VariableStatistics {
    let mut sorted: Vec<f64> = values.iter().cloned().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n < 3 {
        debug!("evaluate_values: only {} valid values", n);
        return VariableStatistics {
            n,
            tested_n: 0,
            mean: f64::NAN,
            median: f64::NAN,
            p_value: f64::NAN,
            recommendation: Recommendation::InsufficientData,
        };
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = median_sorted(&sorted);

    let tested = if n > MAX_TESTED_SAMPLE {
        subsample(&sorted, MAX_TESTED_SAMPLE, SUBSAMPLE_SEED)
    } else {
        sorted
    };
    let tested_n = tested.len();
    let p_value = match shapiro_wilk(&tested) {
        Ok((_, p)) => p,
        Err(e) => {
            debug!("evaluate_values: normality test failed: {:?}", e);
            f64::NAN
        }
    };

    let recommendation = match mode {
        SelectionMode::ForceMean => Recommendation::Mean,
        SelectionMode::ForceMedian => Recommendation::Median,
        // A NaN p-value fails the comparison and leads to the median.
        SelectionMode::Automatic if p_value > NORMALITY_THRESHOLD => Recommendation::Mean,
        SelectionMode::Automatic => Recommendation::Median,
    };
    debug!(
        "evaluate_values: n={} mean={} median={} p={} -> {:?}",
        n, mean, median, p_value, recommendation
    );

    VariableStatistics {
        n,
        tested_n,
        mean,
        median,
        p_value,
        recommendation,
    }
}

/// Evaluates the given expenditure variables over a set of respondents.
pub fn evaluate_columns(
    records: &[SurveyRecord],
    expenses: &[Expense],
    mode: SelectionMode,
) -> BTreeMap<Expense, VariableStatistics> {
    expenses
        .iter()
        .map(|e| {
            let sample: Vec<Option<f64>> = records.iter().map(|r| r.expense(*e)).collect();
            (*e, evaluate(&sample, mode))
        })
        .collect()
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

// The subsample is sorted again, as required by the test.
fn subsample(values: &[f64], size: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut res: Vec<f64> = rand::seq::index::sample(&mut rng, values.len(), size)
        .into_iter()
        .map(|idx| values[idx])
        .collect();
    res.sort_by(|a, b| a.total_cmp(b));
    res
}

// ******** Shapiro-Wilk **********

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];
const SMALL: f64 = 1e-19;

/// Shapiro-Wilk W statistic and p-value of a sorted sample.
fn shapiro_wilk(x: &[f64]) -> Result<(f64, f64), ShapiroError> {
    let n = x.len();
    if n < 3 {
        return Err(ShapiroError::TooFewValues);
    }
    if n > MAX_TESTED_SAMPLE {
        return Err(ShapiroError::TooManyValues);
    }
    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Err(ShapiroError::ZeroRange);
    }

    let half = shapiro_coefficients(n);

    // Antisymmetric coefficients over the whole sample.
    let mut a = vec![0.0; n];
    for (i, ai) in half.iter().enumerate() {
        a[i] = -ai;
        a[n - 1 - i] = *ai;
    }

    // Scaling by the range keeps the sums well conditioned.
    let mean = x.iter().map(|v| v / range).sum::<f64>() / n as f64;
    let mut sax = 0.0;
    let mut ssa = 0.0;
    let mut ssx = 0.0;
    for (ai, xi) in a.iter().zip(x.iter()) {
        let dx = xi / range - mean;
        sax += ai * dx;
        ssa += ai * ai;
        ssx += dx * dx;
    }
    let ssassx = (ssa * ssx).sqrt();
    let w1 = ((ssassx - sax) * (ssassx + sax) / (ssa * ssx)).max(0.0);
    let w = (1.0 - w1).min(1.0);

    if n == 3 {
        // Exact distribution.
        let p = (6.0 / PI) * (w.sqrt().asin() - PI / 3.0);
        return Ok((w, p.clamp(0.0, 1.0)));
    }
    if w1 <= 0.0 {
        return Ok((w, 1.0));
    }

    let an = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return Ok((w, 1e-99));
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    let p = normal_upper_tail((y - m) / s);
    Ok((w, p))
}

/// The first half of the Shapiro-Wilk coefficients, positive, largest first.
fn shapiro_coefficients(n: usize) -> Vec<f64> {
    let nn2 = n / 2;
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }
    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=nn2)
        .map(|i| normal_quantile((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; nn2];
    a[0] = a1;
    let (first_free, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    for i in first_free..nn2 {
        a[i] = -m[i] / fac;
    }
    a
}

// c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, ci| acc * x + ci)
}

/// Quantile function of the standard normal distribution (algorithm AS 241).
pub fn normal_quantile(p: f64) -> f64 {
    let q = p - 0.5;
    if q.abs() <= 0.425 {
        let r = 0.180625 - q * q;
        return q
            * (((((((r * 2509.0809287301226727 + 33430.575583588128105) * r
                + 67265.770927008700853)
                * r
                + 45921.953931549871457)
                * r
                + 13731.693765509461125)
                * r
                + 1971.5909503065514427)
                * r
                + 133.14166789178437745)
                * r
                + 3.387132872796366608)
            / (((((((r * 5226.495278852545925 + 28729.085735721942674) * r
                + 39307.89580009271061)
                * r
                + 21213.794301586595867)
                * r
                + 5394.1960214247511077)
                * r
                + 687.1870074920579083)
                * r
                + 42.313330701600911252)
                * r
                + 1.0);
    }
    let r = if q < 0.0 { p } else { 1.0 - p };
    if r <= 0.0 {
        return if q < 0.0 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let mut r = (-r.ln()).sqrt();
    let val = if r <= 5.0 {
        r -= 1.6;
        (((((((r * 7.7454501427834140764e-4 + 0.0227238449892691845833) * r
            + 0.24178072517745061177)
            * r
            + 1.27045825245236838258)
            * r
            + 3.64784832476320460504)
            * r
            + 5.7694972214606914055)
            * r
            + 4.6303378461565452959)
            * r
            + 1.42343711074968357734)
            / (((((((r * 1.05075007164441684324e-9 + 5.475938084995344946e-4) * r
                + 0.0151986665636164571966)
                * r
                + 0.14810397642748007459)
                * r
                + 0.68976733498510000455)
                * r
                + 1.6763848301838038494)
                * r
                + 2.05319162663775882187)
                * r
                + 1.0)
    } else {
        r -= 5.0;
        (((((((r * 2.01033439929228813265e-7 + 2.71155556874348757815e-5) * r
            + 0.0012426609473880784386)
            * r
            + 0.026532189526576123093)
            * r
            + 0.29656057182850489123)
            * r
            + 1.7848265399172913358)
            * r
            + 5.4637849111641143699)
            * r
            + 6.6579046435011037772)
            / (((((((r * 2.04426310338993978564e-15 + 1.4215117583164458887e-7) * r
                + 1.8463183175100546818e-5)
                * r
                + 7.868691311456132591e-4)
                * r
                + 0.0148753612908506148525)
                * r
                + 0.13692988092273580531)
                * r
                + 0.59983220655588793769)
                * r
                + 1.0)
    };
    if q < 0.0 {
        -val
    } else {
        val
    }
}

/// P(Z > z) for a standard normal Z.
pub fn normal_upper_tail(z: f64) -> f64 {
    0.5 * erfc(z * FRAC_1_SQRT_2)
}

// Complementary error function, with a fractional error below 1.2e-7.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let ans = t
        * (-z * z - 1.26551223
            + t * (1.00002368
                + t * (0.37409196
                    + t * (0.09678418
                        + t * (-0.18628806
                            + t * (0.27886807
                                + t * (-1.13520398
                                    + t * (1.48851587
                                        + t * (-0.82215223 + t * 0.17087277)))))))))
            .exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}
