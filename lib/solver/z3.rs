//! A `Solver` which runs z3 as a child process.
//!
//! Every query runs in a fresh z3 process, reading an SMT-LIB2 script from
//! stdin. The tactic is passed to `check-sat-using`, which enforces any time
//! bounds the tactic carries. A cap on the whole query, on top of the tactic,
//! is only given to z3 when set with `Z3Solver::set_timeout`.

use crate::formula::{symbol, Term};
use crate::solver::{SatResult, Solver, Tactic};
use crate::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Clone, Debug)]
pub struct Z3Solver {
    path: PathBuf,
    timeout: Option<u64>,
}

impl Z3Solver {
    /// A solver using the `z3` found on `PATH`.
    pub fn new() -> Z3Solver {
        Z3Solver {
            path: PathBuf::from("z3"),
            timeout: None,
        }
    }

    /// A solver using the z3 executable at `path`.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Z3Solver {
        Z3Solver {
            path: path.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    /// The z3 executable this solver runs.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The global timeout given to z3, in milliseconds.
    pub fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    /// Cap every query at `milliseconds`, whatever the tactic allows. `None`
    /// leaves time bounds to the tactic alone.
    pub fn set_timeout(&mut self, milliseconds: Option<u64>) {
        self.timeout = milliseconds;
    }

    /// The command line arguments z3 is run with.
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = vec!["-smt2".to_string(), "-in".to_string()];
        if let Some(milliseconds) = self.timeout {
            arguments.push(format!("-t:{}", milliseconds));
        }
        arguments
    }

    /// The SMT-LIB2 script sent to z3 for a query.
    pub fn script(assertion: &Term, tactic: &Tactic) -> String {
        let mut lines = Vec::new();

        // Declare all free constants
        for (name, sort) in assertion.free_constants() {
            lines.push(format!("(declare-const {} {})", symbol(&name), sort));
        }

        lines.push(format!("(assert {})", assertion));
        lines.push(format!("(check-sat-using {})", tactic));
        lines.push("(exit)\n".to_string());

        lines.join("\n")
    }

    /// Interpret the output of z3.
    pub fn parse_output(output: &str) -> Result<SatResult, Error> {
        for line in output.lines() {
            match line.trim() {
                "sat" => return Ok(SatResult::Sat),
                "unsat" => return Ok(SatResult::Unsat),
                "unknown" | "timeout" => return Ok(SatResult::Unknown),
                line if line.contains("error") => return Err(Error::Solver(line.to_string())),
                _ => {}
            }
        }
        Err(Error::Solver(format!(
            "no result in solver output: {}",
            output.trim()
        )))
    }
}

impl Default for Z3Solver {
    fn default() -> Z3Solver {
        Z3Solver::new()
    }
}

impl Solver for Z3Solver {
    fn check(&mut self, assertion: &Term, tactic: &Tactic) -> Result<SatResult, Error> {
        let script = Z3Solver::script(assertion, tactic);
        trace!("z3 script:\n{}", script);

        let mut child = Command::new(&self.path)
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        match child.stdin.take() {
            Some(mut stdin) => {
                if let Err(e) = stdin
                    .write_all(script.as_bytes())
                    .and_then(|_| stdin.flush())
                {
                    // z3 exited before reading the whole script
                    let _ = child.kill();
                    child.wait()?;
                    return Err(e.into());
                }
            }
            None => {
                child.kill()?;
                child.wait()?;
                return Err(Error::Solver(
                    "Failed to get stdin from solver process".to_string(),
                ));
            }
        }

        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Z3Solver::parse_output(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{BvCompareOp, Sort};

    #[test]
    fn script() {
        let x = Term::constant("x", Sort::BitVec(8));
        let assertion = Term::bv_compare(BvCompareOp::Slt, x, Term::bv(0, 8));
        let script = Z3Solver::script(&assertion, &Tactic::named("smt"));
        assert_eq!(
            script,
            "(declare-const x (_ BitVec 8))\n\
             (assert (bvslt x #x00))\n\
             (check-sat-using smt)\n\
             (exit)\n"
        );
    }

    #[test]
    fn parse_output() {
        assert_eq!(Z3Solver::parse_output("sat\n").unwrap(), SatResult::Sat);
        assert_eq!(Z3Solver::parse_output("unsat\n").unwrap(), SatResult::Unsat);
        assert_eq!(
            Z3Solver::parse_output("unknown\n").unwrap(),
            SatResult::Unknown
        );
        assert!(Z3Solver::parse_output("(error \"line 1: unknown constant\")\n").is_err());
        assert!(Z3Solver::parse_output("").is_err());
    }

    #[test]
    fn tactic_bounds_are_left_to_the_tactic() {
        let mut solver = Z3Solver::new();
        assert_eq!(solver.arguments(), vec!["-smt2", "-in"]);

        // A global timeout of 50ms would starve the fallback branch.
        let tactic = Tactic::or_else(vec![
            Tactic::named("sat").try_for(50),
            Tactic::named("smt").try_for(5000),
        ]);
        let script = Z3Solver::script(&Term::Bool(true), &tactic);
        assert!(script.contains(&format!("(check-sat-using {})", tactic)));
        assert!(solver.arguments().iter().all(|arg| !arg.starts_with("-t:")));

        solver.set_timeout(Some(10000));
        assert_eq!(solver.timeout(), Some(10000));
        assert_eq!(solver.arguments(), vec!["-smt2", "-in", "-t:10000"]);
    }

    #[test]
    #[cfg(unix)]
    fn early_exit_is_an_error() {
        // `true` exits without reading the script, or producing a result.
        let mut solver = Z3Solver::with_path("true");
        let x = Term::constant("x", Sort::BitVec(8));
        let assertion = Term::eq(x.clone(), x);
        assert!(solver.check(&assertion, &Tactic::default()).is_err());
    }

    #[test]
    fn missing_executable_is_an_error() {
        let mut solver = Z3Solver::with_path("/nonexistent/z3");
        assert!(solver
            .check(&Term::Bool(true), &Tactic::default())
            .is_err());
    }

    #[test]
    #[ignore] // requires z3 on PATH
    fn z3_decides_queries() {
        let mut solver = Z3Solver::new();
        let x = Term::constant("x", Sort::BitVec(32));
        let neq = Term::not(Term::eq(x.clone(), x));
        assert_eq!(
            solver.check(&neq, &Tactic::default()).unwrap(),
            SatResult::Unsat
        );
    }
}
