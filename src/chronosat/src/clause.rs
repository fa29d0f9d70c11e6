/*****************************************************************************************[clause.rs]
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
    crate::intmap::{AsIndex, IntMap},
    std::{fmt, ops},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0 + 1)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(!0);
    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    /// Make a variable from the index. This should only be used
    /// with integers obtained from an existing `v.idx()`
    #[inline]
    pub fn unsafe_from_idx(idx: u32) -> Self {
        Var::from_idx(idx)
    }
}

impl AsIndex for Var {
    fn as_index(self) -> usize {
        self.0 as usize
    }
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(!1);

    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }
    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !1 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}{:?}", if self.sign() { "" } else { "-" }, self.var())
        }
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
/// A ternary boolean (true, false, undefined) used for partial assignments.
pub struct lbool(u8);

impl fmt::Debug for lbool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "TRUE")
        } else if self.0 == 1 {
            write!(f, "FALSE")
        } else if self.0 <= 3 {
            write!(f, "UNDEF")
        } else {
            // unreachable
            write!(f, "lbool({})", self.0)
        }
    }
}
impl Default for lbool {
    fn default() -> Self {
        lbool(0)
    }
}

impl lbool {
    pub const TRUE: lbool = lbool(0);
    pub const FALSE: lbool = lbool(1);
    pub const UNDEF: lbool = lbool(2);
    pub fn from_u8(v: u8) -> Self {
        debug_assert!(v == (v & 3), "lbool::from_u8: invalid value");
        lbool(v)
    }
    #[inline(always)]
    pub fn new(v: bool) -> Self {
        lbool((!v) as u8)
    }
    #[inline(always)]
    pub fn to_u8(&self) -> u8 {
        self.0
    }
}

// from minisat:
// bool operator == (lbool b) const { return ((b.value&2) & (value&2)) | (!(b.value&2)&(value == b.value)); }
impl PartialEq for lbool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for lbool {}

impl ops::Neg for lbool {
    type Output = lbool;

    /// Negation of a `lbool`
    fn neg(self) -> Self {
        lbool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for lbool {
    type Output = lbool;

    /// Xor of a lbool with a boolean.
    fn bitxor(self, rhs: bool) -> Self {
        lbool(self.0 ^ rhs as u8)
    }
}
impl ops::BitXorAssign<bool> for lbool {
    fn bitxor_assign(&mut self, rhs: bool) {
        *self = *self ^ rhs;
    }
}

impl From<bool> for lbool {
    fn from(x: bool) -> Self {
        if x {
            lbool::TRUE
        } else {
            lbool::FALSE
        }
    }
}

/// A stable handle to a clause in a [`ClauseDb`].
///
/// Handles index an append-only arena, so they stay valid for the whole
/// lifetime of the formula (nothing is ever removed or moved).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CRef(u32);

impl fmt::Debug for CRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CRef({})", self.0)
    }
}

impl AsIndex for CRef {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        CRef(index as u32)
    }
}

/// The clause database: all clauses of the formula, stored back to back
/// in one flat literal arena with an offset table.
///
/// Clauses keep their insertion order, and each clause keeps the order its
/// literals were given in. That order carries no logical meaning but it pins
/// down which literal a unit clause forces and which clause a conflict is
/// reported on, so runs are reproducible.
#[derive(Debug, Clone, Default)]
pub struct ClauseDb {
    lits: Vec<Lit>,
    clauses: Vec<(u32, u32)>, // (offset, len) into `lits`
}

impl ClauseDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clauses stored.
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.clauses.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Total number of literal occurrences.
    pub fn num_lits(&self) -> u64 {
        self.lits.len() as u64
    }

    /// Append a clause, returning its handle.
    pub fn push(&mut self, clause: &[Lit]) -> CRef {
        let cr = CRef(self.clauses.len() as u32);
        let offset = self.lits.len() as u32;
        self.lits.extend_from_slice(clause);
        self.clauses.push((offset, clause.len() as u32));
        cr
    }

    /// The literals of clause `cr`, as a read-only view into the arena.
    #[inline(always)]
    pub fn get(&self, cr: CRef) -> &[Lit] {
        let (offset, len) = self.clauses[cr.as_index()];
        &self.lits[offset as usize..(offset + len) as usize]
    }

    /// Iterate over the handles of all clauses, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = CRef> {
        (0..self.clauses.len()).map(CRef::from_index)
    }
}

impl ops::Index<CRef> for ClauseDb {
    type Output = [Lit];
    #[inline(always)]
    fn index(&self, cr: CRef) -> &Self::Output {
        self.get(cr)
    }
}

/// The occurrence index: `occs[lit]` is the list of clauses in which `lit`
/// occurs with that polarity.
///
/// Built once while clauses are loaded; every literal occurrence of every
/// clause lands in exactly one list. Propagation of a true literal `p` reads
/// `occs[!p]`, the clauses that may have become unit or falsified.
#[derive(Debug, Clone, Default)]
pub struct OccLists {
    occs: LMap<Vec<CRef>>,
}

impl OccLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the list for `lit` exists.
    pub fn init(&mut self, lit: Lit) {
        self.occs.reserve_default(lit);
    }

    /// Record that `lit` occurs in clause `cr`.
    pub fn push(&mut self, lit: Lit, cr: CRef) {
        self.occs[lit].push(cr);
    }
}

impl ops::Index<Lit> for OccLists {
    type Output = [CRef];
    #[inline(always)]
    fn index(&self, lit: Lit) -> &Self::Output {
        &self.occs[lit]
    }
}

/// Anything that can be considered as a list of literals.
pub trait ClauseIterable: fmt::Debug {
    type Item: Copy + Into<Lit>;
    fn items(&self) -> &[Self::Item];
}

/// Any iterable clause can be printed in DIMACS
impl<T: ClauseIterable> display::Print for T {
    // display as DIMACS
    fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for &x in self.items().iter() {
            let lit: Lit = x.into();
            write!(
                out,
                "{}{} ",
                (if lit.sign() { "" } else { "-" }),
                lit.var().idx() + 1
            )?;
        }
        write!(out, "0")?;
        Ok(())
    }
}

impl<'a> ClauseIterable for &'a [Lit] {
    type Item = Lit;
    fn items(&self) -> &[Self::Item] {
        self
    }
}

impl ClauseIterable for Vec<Lit> {
    type Item = Lit;
    fn items(self: &Vec<Lit>) -> &[Self::Item] {
        &self
    }
}

/// Generic interface for objects printable in DIMACS
pub mod display {
    use std::fmt;

    /// Objects that can be printed in DIMACS syntax
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Any type implementing `Print` can be used in a format string by
        /// just using `x.pp_dimacs()` instead of `x`.
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(&self)
        }
    }

    /// A wrapper that can be used to display objects in format strings
    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    // Whenever `T` is printable in DIMACS, its wrapper implements Display
    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_eq() {
        use super::lbool;
        for i in 0..4 {
            let a = lbool::from_u8(i);
            for j in 0..4 {
                let b = lbool::from_u8(j);
                let are_eq = (i == 0 && j == 0) || (i == 1 && j == 1) || (i >= 2 && j >= 2);
                assert_eq!(
                    are_eq,
                    a == b,
                    "{:?}[{}] == {:?}[{}] should be {}",
                    a,
                    i,
                    b,
                    j,
                    are_eq
                );
            }
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(-lbool::TRUE, lbool::FALSE);
        assert_eq!(-lbool::FALSE, lbool::TRUE);
        assert_eq!(-lbool::UNDEF, lbool::UNDEF);
    }

    #[test]
    fn test_bitxor() {
        assert_eq!(lbool::TRUE ^ true, lbool::FALSE);
        assert_eq!(lbool::TRUE ^ false, lbool::TRUE);
        assert_eq!(lbool::FALSE ^ true, lbool::TRUE);
        assert_eq!(lbool::FALSE ^ false, lbool::FALSE);
        assert_eq!(lbool::UNDEF ^ true, lbool::UNDEF);
        assert_eq!(lbool::UNDEF ^ false, lbool::UNDEF);
    }

    #[test]
    fn test_lit_sign_and_neg() {
        let v = Var::from_idx(3);
        let p = Lit::new(v, true);
        assert!(p.sign());
        assert_eq!(p.var(), v);
        let n = !p;
        assert!(!n.sign());
        assert_eq!(n.var(), v);
        assert_eq!(!n, p);
    }

    #[test]
    fn test_clause_db_views() {
        let mut db = ClauseDb::new();
        let v0 = Var::from_idx(0);
        let v1 = Var::from_idx(1);
        let c0 = db.push(&[Lit::new(v0, true), Lit::new(v1, false)]);
        let c1 = db.push(&[Lit::new(v1, true)]);
        assert_eq!(db.len(), 2);
        assert_eq!(db.get(c0), &[Lit::new(v0, true), Lit::new(v1, false)][..]);
        assert_eq!(db.get(c1), &[Lit::new(v1, true)][..]);
        assert_eq!(db.iter().collect::<Vec<_>>(), vec![c0, c1]);
    }

    #[test]
    fn test_occ_lists() {
        let mut db = ClauseDb::new();
        let mut occs = OccLists::new();
        let v0 = Var::from_idx(0);
        for s in &[false, true] {
            occs.init(Lit::new(v0, *s));
        }
        let p = Lit::new(v0, true);
        let c = db.push(&[p]);
        occs.push(p, c);
        assert_eq!(&occs[p], &[c][..]);
        assert!(occs[!p].is_empty());
    }

    #[test]
    fn test_print_dimacs() {
        use super::display::Print;
        let v0 = Var::from_idx(0);
        let v1 = Var::from_idx(1);
        let c = vec![Lit::new(v0, false), Lit::new(v1, true)];
        assert_eq!(format!("{}", c.pp_dimacs()), "-1 2 0");
    }
}
