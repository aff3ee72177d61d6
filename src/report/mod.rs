//! Text rendering of solutions for the CLI frontend.
//!
//! Everything here writes to a caller-supplied `io::Write`, so the CLI can
//! target stdout and tests can target a buffer.

use std::io::Write;

use crate::circuit::Circuit;
use crate::error::{ResnetError, Result};
use crate::solver::{Comparison, RelaxationReport, Solution, ValidationReport};

fn output_error(e: std::io::Error) -> ResnetError {
    ResnetError::OutputError {
        message: e.to_string(),
    }
}

/// Write node voltages and branch currents as an aligned table.
pub fn write_solution<W: Write>(out: &mut W, circuit: &Circuit, solution: &Solution) -> Result<()> {
    writeln!(out, "{:<12} {:>14}  {:<12} {:>14}", "node", "voltage (V)", "to", "current (A)")
        .map_err(output_error)?;

    for (i, result) in solution.results.iter().enumerate() {
        let name = circuit.node_name(i);
        if result.connections.is_empty() {
            writeln!(out, "{:<12} {:>14.9}", name, result.voltage).map_err(output_error)?;
            continue;
        }
        for (k, branch) in result.connections.iter().enumerate() {
            let (label, voltage) = if k == 0 {
                (name.as_str(), format!("{:>14.9}", result.voltage))
            } else {
                ("", String::new())
            };
            writeln!(
                out,
                "{:<12} {:>14}  {:<12} {:>14.9}",
                label,
                voltage,
                circuit.node_name(branch.to),
                branch.current
            )
            .map_err(output_error)?;
        }
    }
    Ok(())
}

/// Write the validation outcome, one line per violation.
pub fn write_validation<W: Write>(out: &mut W, report: &ValidationReport) -> Result<()> {
    if report.is_ok() {
        writeln!(out, "validation: ok").map_err(output_error)?;
        return Ok(());
    }
    writeln!(out, "validation: {} violation(s)", report.violations.len()).map_err(output_error)?;
    for violation in &report.violations {
        writeln!(out, "  {}", violation).map_err(output_error)?;
    }
    Ok(())
}

/// Write relaxation diagnostics.
pub fn write_relaxation<W: Write>(out: &mut W, report: &RelaxationReport) -> Result<()> {
    let first = report.imbalance_history.first().copied().unwrap_or(f64::NAN);
    let last = report.imbalance_history.last().copied().unwrap_or(f64::NAN);
    writeln!(
        out,
        "relaxation: {} passes, imbalance {:.6e} -> {:.6e}, final {:.3e}",
        report.iterations, first, last, report.final_imbalance
    )
    .map_err(output_error)?;
    if let Some(warning) = report.divergence {
        writeln!(
            out,
            "warning: imbalance grew from {:.3e} to {:.3e}; try a smaller learning rate",
            warning.initial_imbalance, warning.final_imbalance
        )
        .map_err(output_error)?;
    }
    Ok(())
}

/// Write a solution comparison.
pub fn write_comparison<W: Write>(out: &mut W, label: &str, cmp: &Comparison) -> Result<()> {
    writeln!(
        out,
        "{}: mean |dV| {:.3e}, max |dV| {:.3e}, mean |dI| per node {:.3e}, max |dI| {:.3e}",
        label, cmp.mean_voltage_error, cmp.max_voltage_error, cmp.mean_current_error, cmp.max_current_error
    )
    .map_err(output_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{ResultExtractor, Violation};

    #[test]
    fn test_write_solution_lists_every_branch() {
        let mut c = Circuit::with_nodes(3);
        c.add_resistor(0, 1, 1.0).unwrap();
        c.add_resistor(1, 2, 1.0).unwrap();
        let solution = ResultExtractor::extract(&c, vec![1.0, 0.5, 0.0]).unwrap();

        let mut buf = Vec::new();
        write_solution(&mut buf, &c, &solution).unwrap();
        let text = String::from_utf8(buf).unwrap();

        // header + one line per directed connection
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("0.500000000"));
        assert!(text.contains("-0.500000000"));
    }

    #[test]
    fn test_write_validation() {
        let mut buf = Vec::new();
        let report = ValidationReport {
            violations: vec![Violation::NanVoltage { node: 3 }],
        };
        write_validation(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("validation: 1 violation(s)"));
        assert!(text.contains("node 3 has an undefined voltage"));
    }

    #[test]
    fn test_write_relaxation_warns_on_divergence() {
        let report = RelaxationReport {
            iterations: 2,
            error_history: vec![1.0, 4.0],
            imbalance_history: vec![1.0, 4.0],
            final_imbalance: 9.0,
            divergence: Some(crate::solver::DivergenceWarning {
                initial_imbalance: 1.0,
                final_imbalance: 4.0,
            }),
        };
        let mut buf = Vec::new();
        write_relaxation(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("warning: imbalance grew"));
    }

    #[test]
    fn test_write_relaxation_quiet_when_settled() {
        let report = RelaxationReport {
            iterations: 2,
            error_history: vec![1.0, 4.0],
            imbalance_history: vec![1.0, 1e-20],
            final_imbalance: 1e-20,
            divergence: None,
        };
        let mut buf = Vec::new();
        write_relaxation(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("warning"));
    }
}
