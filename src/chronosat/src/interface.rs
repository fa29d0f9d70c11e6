
/* Main Interface */

use crate::clause::{lbool, Lit, Var};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, and check for satisfiability
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;

    /// `false` once an empty clause has been added: the formula is trivially
    /// unsatisfiable and no search will be performed.
    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver.
    fn new_var_default(&mut self) -> Var;

    /// Obtain the variable corresponding to the 0-based index `v_idx`,
    /// creating intermediate variables if needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver. Returns `false` if the solver is in
    /// an `UNSAT` state.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Run the DPLL search on the clauses added so far.
    ///
    /// Returns `lbool::TRUE` if a satisfying assignment was found,
    /// `lbool::FALSE` if the formula is unsatisfiable, and `lbool::UNDEF`
    /// if the stop predicate interrupted the search.
    fn solve(&mut self) -> lbool;

    /// Query whole model
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn get_model(&self) -> &[lbool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit
    fn value_lit(&self, lit: Lit) -> lbool;
}
