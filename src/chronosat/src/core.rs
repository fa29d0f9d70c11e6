/*****************************************************************************************[core.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::callbacks::{Basic, Callbacks},
    crate::clause::{lbool, CRef, ClauseDb, LMap, Lit, OccLists, VMap, Var},
    crate::clause::display::Print,
    crate::interface::SolverInterface,
    std::fmt,
};

/// The main solver structure
///
/// A `Solver` object contains the whole state of one DPLL search: the clause
/// database, the occurrence index, the trail, activity scores and statistics.
/// Several solvers can coexist; nothing is shared between them.
///
/// It is parametrized by `Callbacks`
pub struct Solver<Cb: Callbacks> {
    // Extra results: (read-only member variable)
    /// If problem is satisfiable, this vector contains the model (if any).
    model: Vec<lbool>,

    cb: Cb, // the callbacks

    /// The immutable-after-load list of problem clauses.
    db: ClauseDb,
    /// `occs[lit]` lists the clauses containing `lit`, by stable handle.
    occs: OccLists,

    v: SolverV,
}

/// The current assignments.
struct VarState {
    /// Current assignment for each variable.
    ass: VMap<lbool>,
    /// Assignment stack; stores all assigments made in the order they were made.
    trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    trail_lim: Vec<i32>,
    /// Head of queue (as index into the trail -- the propagation cursor).
    qhead: i32,
}

struct SolverV {
    vars: VarState,

    /// A heuristic measurement of the activity of each literal (both
    /// polarities of every variable).
    activity: LMap<f64>,
    /// Amount to bump a literal with when its clause is conflicting.
    act_inc: f64,
    /// Every this many conflicts, all activities are halved.
    decay_interval: u64,

    // Statistics: (read-only member variable)
    decisions: u64,
    propagations: u64,
    conflicts: u64,

    /// If `false`, the constraints are already unsatisfiable. No search is performed.
    ok: bool,

    /// Next variable to be created.
    next_var: Var,
}

/// Print the model as DIMACS (`v` line)
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

mod dimacs_out {
    use super::*;

    impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "v ")?;
            for (i, &val) in self.s.model.iter().enumerate() {
                if val == lbool::TRUE {
                    write!(out, "{} ", i + 1)?
                } else if val == lbool::FALSE {
                    write!(out, "-{} ", i + 1)?
                }
            }
            writeln!(out, "0")
        }
    }
}

// public API
impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn new_var_default(&mut self) -> Var {
        let v = self.v.new_var();
        self.occs.init(Lit::new(v, false));
        self.occs.init(Lit::new(v, true));
        v
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var_default();
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    // in the API, we can only add clauses at level 0
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        debug_assert_eq!(
            self.v.decision_level(),
            0,
            "add clause at non-zero decision level"
        );
        if !self.v.ok {
            return false;
        }
        // The empty clause is unsatisfiable on its own.
        if clause.is_empty() {
            self.v.ok = false;
            return false;
        }
        // Literal order is kept as given: it decides which literal a unit
        // clause forces first, hence the exact propagation statistics.
        let cr = self.db.push(clause);
        for &lit in self.db.get(cr) {
            self.occs.push(lit, cr);
        }
        true
    }

    fn solve(&mut self) -> lbool {
        self.solve_internal()
    }

    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&v| v)
    }
    fn value_lit(&self, v: Lit) -> lbool {
        self.value_var(v.var()) ^ !v.sign()
    }
    fn get_model(&self) -> &[lbool] {
        &self.model
    }
    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn num_vars(&self) -> u32 {
        self.v.next_var.idx()
    }
    fn num_clauses(&self) -> u64 {
        self.db.len() as u64
    }
    fn num_conflicts(&self) -> u64 {
        self.v.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.v.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.v.decisions
    }

    fn print_stats(&self) {
        println!("c conflicts             : {:<12}", self.v.conflicts);
        println!("c decisions             : {:<12}", self.v.decisions);
        println!("c propagations          : {:<12}", self.v.propagations);
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl Solver<Basic> {
    /// Set a predicate consulted once per decision; the search gives up
    /// (returns `lbool::UNDEF`) when it returns `true`.
    pub fn set_stop_pred<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.cb.set_stop(f);
    }
}

// main algorithm
impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check());
        Self {
            model: vec![],
            cb,
            db: ClauseDb::new(),
            occs: OccLists::new(),
            v: SolverV::new(&opts),
        }
    }

    /// Print the model as a DIMACS `v` line.
    ///
    /// Precondition: last result was SAT.
    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    fn solve_internal(&mut self) -> lbool {
        self.cb.on_start();
        info!(
            "solve: {} vars, {} clauses",
            self.num_vars(),
            self.num_clauses()
        );

        let res = if !self.v.ok || !self.assert_unit_clauses() {
            self.v.ok = false;
            lbool::FALSE
        } else {
            self.search()
        };

        if res == lbool::TRUE {
            // Extract the full model, then double-check it against every
            // clause before anyone gets to see it.
            self.model.clear();
            for idx in 0..self.num_vars() {
                let v = Var::from_idx(idx);
                debug_assert_ne!(self.v.vars.value(v), lbool::UNDEF);
                self.model.push(self.v.vars.value(v));
            }
            self.verify_model();
        } else if res == lbool::FALSE {
            self.v.ok = false;
        }

        self.cb.on_result(res);
        res
    }

    /// Seed the trail with the unit clauses of the formula.
    ///
    /// Returns `false` if two unit clauses contradict each other, in which
    /// case the formula is unsatisfiable with zero decisions.
    fn assert_unit_clauses(&mut self) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);
        for cr in self.db.iter() {
            let c = self.db.get(cr);
            if c.len() == 1 {
                let lit = c[0];
                let value = self.v.vars.value_lit(lit);
                if value == lbool::FALSE {
                    debug!("unit clause {:?} already falsified", lit);
                    return false;
                } else if value == lbool::UNDEF {
                    self.v.vars.unchecked_enqueue(lit);
                }
            }
        }
        true
    }

    /// Main DPLL loop: propagate to fixpoint, backtrack on conflict,
    /// decide when propagation stalls.
    ///
    /// # Output:
    ///
    /// - `lbool::TRUE` if all variables got assigned without conflict: the
    ///   clause set is satisfiable.
    /// - `lbool::FALSE` on a conflict at decision level 0.
    /// - `lbool::UNDEF` if the stop predicate interrupted the search.
    fn search(&mut self) -> lbool {
        debug_assert!(self.v.ok);

        loop {
            let confl = self.v.propagate(&self.db, &self.occs);

            if let Some(confl) = confl {
                // conflict: undo the latest decision, or give up at level 0
                trace!("conflict in clause {:?}", confl);
                if self.v.decision_level() == 0 {
                    return lbool::FALSE;
                }
                self.v.backtrack();
            } else {
                // no conflict; the trail is saturated
                if self.cb.stop() {
                    debug!("search stopped by callback");
                    return lbool::UNDEF;
                }

                let next = self.v.pick_branch_lit();
                if next == Lit::UNDEF {
                    // every variable assigned, every clause satisfied
                    return lbool::TRUE;
                }

                self.v.decisions += 1;
                debug!("pick-next {:?}", next);
                self.v.vars.new_decision_level();
                self.v.vars.unchecked_enqueue(next);
            }
        }
    }

    /// Independent re-check of the SAT verdict: every clause must contain a
    /// true literal. A failure here is a defect in propagation or
    /// backtracking, never a property of the input, so it is fatal.
    fn verify_model(&self) {
        for cr in self.db.iter() {
            let c = self.db.get(cr);
            let satisfied = c.iter().any(|&lit| self.v.vars.value_lit(lit) == lbool::TRUE);
            if !satisfied {
                panic!("model does not satisfy clause {}", c.pp_dimacs());
            }
        }
        debug!("model verified against {} clauses", self.num_clauses());
    }
}

impl SolverV {
    fn new(opts: &SolverOpts) -> Self {
        Self {
            vars: VarState::new(),
            activity: LMap::new(),
            act_inc: opts.activity_inc,
            decay_interval: opts.decay_interval,
            decisions: 0,
            propagations: 0,
            conflicts: 0,
            ok: true,
            next_var: Var::from_idx(0),
        }
    }

    fn new_var(&mut self) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(self.next_var.idx() + 1);
        self.vars.ass.insert_default(v, lbool::UNDEF);
        self.activity.insert_default(Lit::new(v, false), 0.0);
        self.activity.insert_default(Lit::new(v, true), 0.0);
        v
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    /// Propagates all enqueued facts.
    ///
    /// Drains the trail from the cursor: for each newly true literal `p`,
    /// every clause of `occs[!p]` is scanned once. A clause with some true
    /// literal needs no action; one with a single unassigned literal forces
    /// it (appended to the trail, picked up later by the cursor); one with
    /// none is conflicting and is returned.
    ///
    /// # Post-conditions:
    ///
    /// - on `None`, the cursor has reached the end of the trail (fixpoint).
    fn propagate(&mut self, db: &ClauseDb, occs: &OccLists) -> Option<CRef> {
        while (self.vars.qhead as usize) < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.vars.qhead as usize];
            self.vars.qhead += 1;
            self.propagations += 1;
            trace!("propagating trail[{}] = {:?}", self.vars.qhead - 1, p);

            // `p` is true, so clauses containing `!p` may have shrunk.
            for &cr in occs[!p].iter() {
                let c = db.get(cr);

                let mut num_undef = 0;
                let mut last_undef = Lit::UNDEF;
                let mut satisfied = false;
                for &lit in c {
                    let value = self.vars.value_lit(lit);
                    if value == lbool::TRUE {
                        satisfied = true;
                        break;
                    } else if value == lbool::UNDEF {
                        num_undef += 1;
                        last_undef = lit;
                    }
                }

                if satisfied {
                    continue;
                }
                if num_undef == 0 {
                    // all literals false: conflict
                    self.on_conflict(c);
                    return Some(cr);
                } else if num_undef == 1 {
                    trace!("propagation: got {:?}", last_undef);
                    self.vars.unchecked_enqueue(last_undef);
                }
            }
        }
        debug_assert_eq!(self.vars.qhead as usize, self.vars.trail.len());
        None
    }

    /// Bump the activity of every literal of a conflicting clause, halving
    /// all scores first whenever the conflict counter hits the decay
    /// interval, so recent conflicts dominate without unbounded growth.
    fn on_conflict(&mut self, clause: &[Lit]) {
        self.conflicts += 1;
        if self.conflicts % self.decay_interval == 0 {
            for (_, act) in self.activity.iter_mut() {
                *act /= 2.0;
            }
        }
        for &lit in clause {
            self.activity[lit] += self.act_inc;
        }
    }

    /// Pick a literal to make a decision with, or `Lit::UNDEF` if every
    /// variable is already assigned.
    ///
    /// Scans unassigned variables in index order, positive polarity before
    /// negative, comparing activities against the running maximum with `>=`:
    /// among equal scores the *last* candidate in scan order wins. This exact
    /// tie-break (not "first wins") is part of the observable behavior --
    /// changing it changes the search order and the reported statistics.
    fn pick_branch_lit(&self) -> Lit {
        let mut max_activity = 0.0;
        let mut next = Lit::UNDEF;

        for idx in 0..self.next_var.idx() {
            let v = Var::from_idx(idx);
            if self.vars.value(v) == lbool::UNDEF {
                let pos = Lit::new(v, true);
                if self.activity[pos] >= max_activity {
                    max_activity = self.activity[pos];
                    next = pos;
                }
                let neg = Lit::new(v, false);
                if self.activity[neg] >= max_activity {
                    max_activity = self.activity[neg];
                    next = neg;
                }
            }
        }
        next
    }

    /// Undo the most recent decision together with everything it implied,
    /// then assert the opposite polarity as a forced assignment at the (now
    /// lower) level. Chronological, non-learning backtracking: each decision
    /// has exactly one alternative.
    fn backtrack(&mut self) {
        debug_assert!(self.decision_level() > 0);
        let lim = self.vars.trail_lim.pop().expect("trail_lim is empty") as usize;
        // the decision literal sits right at the level separator
        let decision = self.vars.trail[lim];

        for c in (lim..self.vars.trail.len()).rev() {
            let x = self.vars.trail[c].var();
            self.vars.ass[x] = lbool::UNDEF;
        }
        self.vars.trail.resize(lim, Lit::UNDEF);
        // nothing beyond the new trail end is left to re-derive from
        self.vars.qhead = lim as i32;

        debug!(
            "backtrack to level {}, flip {:?}",
            self.decision_level(),
            decision
        );
        self.vars.unchecked_enqueue(!decision);
    }
}

impl VarState {
    fn new() -> Self {
        Self {
            ass: VMap::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
        }
    }

    #[inline(always)]
    fn value(&self, v: Var) -> lbool {
        self.ass[v]
    }

    #[inline(always)]
    fn value_lit(&self, l: Lit) -> lbool {
        self.ass[l.var()] ^ !l.sign()
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len() as i32);
    }

    fn unchecked_enqueue(&mut self, p: Lit) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = lbool::new(p.sign());
        self.trail.push(p);
    }
}

/// Tunable constants of the solver.
pub struct SolverOpts {
    /// Activity added to each literal of a conflicting clause.
    pub activity_inc: f64,
    /// Number of conflicts between two halvings of all activities.
    pub decay_interval: u64,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            activity_inc: 1.0,
            decay_interval: 1000,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        self.activity_inc > 0.0 && self.decay_interval >= 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mk_solver(clauses: &[&[i32]]) -> Solver<Basic> {
        let mut s = Solver::new(SolverOpts::default(), Basic::new());
        add_clauses(&mut s, clauses);
        s
    }

    fn add_clauses(s: &mut Solver<Basic>, clauses: &[&[i32]]) {
        let mut lits = vec![];
        for c in clauses {
            lits.clear();
            for &l in c.iter() {
                assert_ne!(l, 0);
                let v = s.var_of_int((l.abs() - 1) as u32);
                lits.push(Lit::new(v, l > 0));
            }
            s.add_clause_reuse(&mut lits);
        }
    }

    fn lit_true(s: &Solver<Basic>, l: i32) -> bool {
        let v = Var::from_idx((l.abs() - 1) as u32);
        s.value_lit(Lit::new(v, l > 0)) == lbool::TRUE
    }

    #[test]
    fn unit_clause_forces_assignment() {
        let mut s = mk_solver(&[&[1]]);
        assert_eq!(s.solve(), lbool::TRUE);
        assert!(lit_true(&s, 1));
        assert_eq!(s.num_decisions(), 0);
        assert_eq!(s.num_propagations(), 1);
    }

    #[test]
    fn contradictory_units_fail_before_search() {
        let mut s = mk_solver(&[&[1], &[-1]]);
        assert_eq!(s.solve(), lbool::FALSE);
        assert_eq!(s.num_decisions(), 0);
        assert!(!s.is_ok());
    }

    #[test]
    fn propagation_chain_needs_no_decision() {
        let mut s = mk_solver(&[&[1], &[-1, 2], &[-2, 3]]);
        assert_eq!(s.solve(), lbool::TRUE);
        assert!(lit_true(&s, 1));
        assert!(lit_true(&s, 2));
        assert!(lit_true(&s, 3));
        assert_eq!(s.num_decisions(), 0);
    }

    #[test]
    fn two_vars_all_sign_combinations_unsat() {
        let mut s = mk_solver(&[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        assert_eq!(s.solve(), lbool::FALSE);
        // both polarities of the decision must have been explored
        assert!(s.num_decisions() >= 1);
        assert!(s.num_conflicts() >= 2);
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut s = Solver::new(SolverOpts::default(), Basic::new());
        let mut empty = vec![];
        assert!(!s.add_clause_reuse(&mut empty));
        assert!(!s.is_ok());
        assert_eq!(s.solve(), lbool::FALSE);
    }

    #[test]
    fn satisfied_unit_is_not_reasserted() {
        // (1) appears twice; the second occurrence is already true
        let mut s = mk_solver(&[&[1], &[1]]);
        assert_eq!(s.solve(), lbool::TRUE);
        assert_eq!(s.num_propagations(), 1);
    }

    #[test]
    fn stop_predicate_interrupts() {
        let mut s = mk_solver(&[&[1, 2], &[-1, 2]]);
        s.set_stop_pred(|| true);
        assert_eq!(s.solve(), lbool::UNDEF);
    }

    #[test]
    fn backtrack_flips_decision_and_resets_cursor() {
        let mut s = mk_solver(&[&[1, 2]]);
        let a = Lit::new(Var::from_idx(0), true);
        s.v.vars.new_decision_level();
        s.v.vars.unchecked_enqueue(a);
        assert!(s.v.propagate(&s.db, &s.occs).is_none());
        assert_eq!(s.v.decision_level(), 1);

        s.v.backtrack();
        assert_eq!(s.v.decision_level(), 0);
        assert_eq!(s.v.vars.trail.len(), 1);
        assert_eq!(s.v.vars.qhead, 0);
        assert_eq!(s.v.vars.value_lit(!a), lbool::TRUE);
    }

    #[test]
    fn deterministic_statistics() {
        let f: &[&[i32]] = &[
            &[1, 2, -3],
            &[-1, 3],
            &[-2, -3],
            &[2, 3, 4],
            &[-4, 1],
            &[-1, -2, -4],
        ];
        let mut s1 = mk_solver(f);
        let mut s2 = mk_solver(f);
        let r1 = s1.solve();
        let r2 = s2.solve();
        assert_eq!(r1, r2);
        assert_eq!(s1.num_decisions(), s2.num_decisions());
        assert_eq!(s1.num_propagations(), s2.num_propagations());
        assert_eq!(s1.num_conflicts(), s2.num_conflicts());
    }

    /// Exhaustive reference check for small formulas.
    fn brute_force_sat(num_vars: u32, clauses: &[Vec<i32>]) -> bool {
        assert!(num_vars <= 20);
        for mask in 0..(1u32 << num_vars) {
            let ok = clauses.iter().all(|c| {
                c.iter().any(|&l| {
                    let bit = (mask >> (l.abs() - 1)) & 1 == 1;
                    if l > 0 {
                        bit
                    } else {
                        !bit
                    }
                })
            });
            if ok {
                return true;
            }
        }
        false
    }

    #[test]
    fn agrees_with_brute_force_on_random_3sat() {
        // simple LCG so the formulas are fixed across runs
        let mut seed = 0x12345678u64;
        let mut rand = move |bound: u32| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as u32) % bound
        };

        let num_vars = 6;
        for _round in 0..50 {
            let num_clauses = 8 + rand(12);
            let mut clauses: Vec<Vec<i32>> = vec![];
            for _ in 0..num_clauses {
                let mut c = vec![];
                for _ in 0..3 {
                    let v = 1 + rand(num_vars) as i32;
                    c.push(if rand(2) == 0 { v } else { -v });
                }
                clauses.push(c);
            }

            let refs: Vec<&[i32]> = clauses.iter().map(|c| c.as_slice()).collect();
            let mut s = mk_solver(&refs);
            // make sure all variables exist even if some never occur
            s.var_of_int(num_vars - 1);
            let res = s.solve();

            let expected = brute_force_sat(num_vars, &clauses);
            assert_eq!(res == lbool::TRUE, expected, "formula: {:?}", clauses);
            if res == lbool::TRUE {
                // soundness: the model satisfies every clause
                for c in &clauses {
                    assert!(c.iter().any(|&l| lit_true(&s, l)), "clause {:?}", c);
                }
            }
        }
    }

    #[test]
    fn model_covers_all_declared_variables() {
        let mut s = mk_solver(&[&[1]]);
        // variable 3 exists but occurs in no clause
        s.var_of_int(2);
        assert_eq!(s.solve(), lbool::TRUE);
        assert_eq!(s.get_model().len(), 3);
        assert!(s.get_model().iter().all(|&v| v != lbool::UNDEF));
    }
}
