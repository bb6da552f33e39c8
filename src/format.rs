pub fn time(ns: f64) -> String {
    if ns < 1.0 {
        format!("{:>6} ps", short(ns * 1e3))
    } else if ns < 10f64.powi(3) {
        format!("{:>6} ns", short(ns))
    } else if ns < 10f64.powi(6) {
        format!("{:>6} µs", short(ns / 1e3))
    } else if ns < 10f64.powi(9) {
        format!("{:>6} ms", short(ns / 1e6))
    } else {
        format!("{:>6} s", short(ns / 1e9))
    }
}

pub fn short(n: f64) -> String {
    let n_abs = n.abs();

    if n_abs < 10.0 {
        format!("{:.4}", n)
    } else if n_abs < 100.0 {
        format!("{:.3}", n)
    } else if n_abs < 1000.0 {
        format!("{:.2}", n)
    } else if n_abs < 10000.0 {
        format!("{:.1}", n)
    } else {
        format!("{:.0}", n)
    }
}

/// Coefficient estimates keep six decimals, like the fitted-line readouts
pub fn estimate(n: f64) -> String {
    format!("{:.6}", n)
}

pub fn p_value(p: f64) -> String {
    if p.is_nan() {
        String::from("NaN")
    } else if p < 1e-3 {
        String::from("<0.001")
    } else {
        format!("{:.3}", p)
    }
}

pub fn percent(n: usize, total: usize) -> String {
    format!("{:.2}%", 100. * n as f64 / total as f64)
}

/// Format a number with thousands separators.
// Based on the corresponding libtest functionality, see
// https://github.com/rust-lang/rust/blob/557359f92512ca88b62a602ebda291f17a953002/library/test/src/bench.rs#L87-L109
fn thousands_sep(mut n: u64, sep: char) -> String {
    use std::fmt::Write;
    let mut output = String::new();
    let mut trailing = false;
    for &pow in &[18, 15, 12, 9, 6, 3, 0] {
        let base = 10_u64.pow(pow);
        if pow == 0 || trailing || n / base != 0 {
            if !trailing {
                let _ = write!(output, "{}", n / base);
            } else {
                let _ = write!(output, "{:03}", n / base);
            }
            if pow != 0 {
                output.push(sep);
            }
            trailing = true;
        }
        n %= base;
    }

    output
}

/// Format a value as an integer, including thousands-separators.
pub fn integer(n: f64) -> String {
    if n < 0. {
        format!("-{}", thousands_sep(n.abs().round() as u64, ','))
    } else {
        thousands_sep(n.round() as u64, ',')
    }
}
