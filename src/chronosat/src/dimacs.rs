/*****************************************************************************************[dimacs.rs]
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
    crate::{interface::SolverInterface, Lit},
    std::io::{self, BufRead},
};

/// `parse(input, solver, is_strict)` adds the content of `input` to the solver
///
/// The input is DIMACS CNF: optional `c` comment lines, a `p cnf <vars>
/// <clauses>` header, then clauses as whitespace-separated signed integers,
/// each terminated by `0`. Variables are materialized in the solver as they
/// are first mentioned, so a literal can never reference a variable the
/// solver does not know about.
///
/// ## Params
/// - `is_strict` if true, will fail if the number of clauses does not match
///   the declared header
pub fn parse<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    is_strict: bool,
) -> io::Result<()> {
    let mut lits = vec![];
    let mut num_clauses = 0;
    let mut num_read_clauses = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut header = [0; 5];
            input.read_exact(&mut header)?;
            if &header != b"p cnf" {
                return parse_error(format!("PARSE ERROR! Unexpected char: p"));
            }
            // the declared variable count is advisory; variables are created
            // on first use
            parse_int(input)?;
            num_clauses = parse_int(input)?;
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if let Some(_) = ch {
            read_clause(input, solver, &mut lits)?;
            solver.add_clause_reuse(&mut lits);
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    if is_strict && num_clauses != num_read_clauses {
        return parse_error(format!(
            "PARSE ERROR! DIMACS header mismatch: wrong number of clauses"
        ));
    }
    Ok(())
}

fn read_clause<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    lits: &mut Vec<Lit>,
) -> io::Result<()> {
    lits.clear();
    loop {
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(());
        }
        let var = (parsed_lit.abs() - 1) as u32;
        let lit = Lit::new(solver.var_of_int(var), parsed_lit > 0);
        lits.push(lit);
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> io::Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    if let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            return parse_error(format!("PARSE ERROR! Unexpected char: {}", ch as char));
        }
    } else {
        return parse_error(format!("PARSE ERROR! Unexpected EOF"));
    };
    let mut val = 0;
    while let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            break;
        }
        input.consume(1);
        val = val * 10 + (ch - b'0') as i32;
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| b'\x09' <= ch && ch <= b'\x0d' || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> io::Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    loop {
        if let Some(ch) = next_byte(input)? {
            input.consume(1);
            if ch == b'\n' {
                return Ok(());
            }
        } else {
            return Ok(());
        }
    }
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().map(|&ch| ch))
}

fn parse_error<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{lbool, BasicSolver};
    use std::io::Cursor;

    #[test]
    fn parse_simple_cnf() {
        let cnf = b"c a comment\np cnf 3 3\n1 0\n-1 2 0\n-2 3 0\n";
        let mut s = BasicSolver::default();
        parse(&mut Cursor::new(&cnf[..]), &mut s, true).unwrap();
        assert_eq!(s.num_vars(), 3);
        assert_eq!(s.num_clauses(), 3);
        assert_eq!(s.solve(), lbool::TRUE);
        assert_eq!(s.num_decisions(), 0);
    }

    #[test]
    fn parse_accepts_clauses_spanning_lines() {
        let cnf = b"p cnf 2 1\n1\n-2 0\n";
        let mut s = BasicSolver::default();
        parse(&mut Cursor::new(&cnf[..]), &mut s, true).unwrap();
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn strict_mode_rejects_wrong_clause_count() {
        let cnf = b"p cnf 2 2\n1 2 0\n";
        let mut s = BasicSolver::default();
        let res = parse(&mut Cursor::new(&cnf[..]), &mut s, true);
        assert!(res.is_err());
    }

    #[test]
    fn lenient_mode_ignores_header_mismatch() {
        let cnf = b"p cnf 2 2\n1 2 0\n";
        let mut s = BasicSolver::default();
        parse(&mut Cursor::new(&cnf[..]), &mut s, false).unwrap();
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn rejects_garbage() {
        let cnf = b"p cnf 1 1\nx 0\n";
        let mut s = BasicSolver::default();
        assert!(parse(&mut Cursor::new(&cnf[..]), &mut s, false).is_err());
    }
}
