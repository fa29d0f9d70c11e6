/*****************************************************************************************[main.rs]
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

extern crate chronosat;
extern crate clap;
extern crate cpu_time;
extern crate env_logger;
extern crate flate2;
#[macro_use]
extern crate log;

use chronosat::{lbool, BasicCallbacks, BasicSolver, SolverInterface, SolverOpts};
use clap::{App, Arg};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::exit;
use std::time::Instant;

mod system;

fn main() {
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(1)
    });
    exit(exitcode);
}

fn main2() -> io::Result<i32> {
    let resource = system::ResourceMeasure::new();

    let matches = App::new("chronosat")
        .version("0.1.0")
        .about("DPLL SAT solver with chronological backtracking")
        .arg(Arg::with_name("input-file"))
        .arg(
            Arg::with_name("model")
                .long("model")
                .help("Print the satisfying assignment as a DIMACS v line"),
        )
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .default_value("1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu-lim")
                .long("cpu-lim")
                .help("CPU time budget in seconds; the search is abandoned once exceeded")
                .default_value("-1.0")
                .takes_value(true),
        )
        .arg(Arg::with_name("is-strict").long("strict"))
        .arg(
            Arg::with_name("act-inc")
                .long("act-inc")
                .help("Activity bump added to each literal of a conflicting clause")
                .default_value("1.0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("decay-interval")
                .long("decay-interval")
                .help("Number of conflicts between two halvings of all activities")
                .default_value("1000")
                .takes_value(true),
        )
        .get_matches();

    let mut solver_opts = SolverOpts::default();
    solver_opts.activity_inc = matches
        .value_of("act-inc")
        .and_then(|s| s.parse().ok())
        .unwrap_or(solver_opts.activity_inc);
    solver_opts.decay_interval = matches
        .value_of("decay-interval")
        .and_then(|s| s.parse().ok())
        .unwrap_or(solver_opts.decay_interval);

    if !solver_opts.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let input_file = matches.value_of("input-file");
    let print_model = matches.is_present("model");
    let verbosity = matches
        .value_of("verbosity")
        .unwrap()
        .parse::<i32>()
        .unwrap_or(0);
    if verbosity < 0 || verbosity > 2 {
        eprintln!(
            "ERROR! value <{}> is too small for option \"verb\".",
            verbosity
        );
        exit(1);
    }
    let is_strict = matches.is_present("is-strict");
    let cpu_lim: Option<f64> = matches
        .value_of("cpu-lim")
        .and_then(|s| s.parse().ok())
        .filter(|x| *x > 0.);

    let mut solver = BasicSolver::new(solver_opts, BasicCallbacks::new());

    // setup timeout handler, if any
    if let Some(max_cpu) = cpu_lim {
        assert!(max_cpu > 0.);
        let r = system::ResourceMeasure::new();
        let f = move || r.cpu_time() > max_cpu;
        solver.set_stop_pred(f);
    }

    let initial_time = Instant::now();

    if let Some(input_file) = input_file {
        debug!("solve file {}", input_file);
        let file = BufReader::new(File::open(input_file)?);
        read_input_autogz(file, &mut solver, is_strict)?;
    } else {
        println!("c Reading from standard input... Use '--help' for help.");
        let stdin = io::stdin();
        read_input_autogz(stdin.lock(), &mut solver, is_strict)?;
    }

    if verbosity > 0 {
        println!(
            "c |  Number of variables:  {:12}                                         |",
            solver.num_vars()
        );
        println!(
            "c |  Number of clauses:    {:12}                                         |",
            solver.num_clauses()
        );
        let duration = Instant::now() - initial_time;
        println!(
            "c |  Parse time:           {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_nanos() / 10_000_000
        );
    }

    let ret = solver.solve();

    if verbosity > 0 {
        solver.print_stats();
        println!("c CPU time              : {:.3}s", resource.cpu_time());
    }

    if ret == lbool::TRUE {
        println!(
            "SATISFIABLE,{},{}",
            solver.num_decisions(),
            solver.num_propagations()
        );
        if print_model {
            print!("{}", solver.dimacs_model());
        }
    } else if ret == lbool::FALSE {
        println!(
            "UNSATISFIABLE,{},{}",
            solver.num_decisions(),
            solver.num_propagations()
        );
    } else {
        println!("INDETERMINATE");
    }

    let exitcode = if ret == lbool::TRUE {
        20
    } else if ret == lbool::FALSE {
        10
    } else {
        0
    };

    if !cfg!(debug_assertions) {
        // (faster than "return", which will invoke the destructor for 'Solver')
        exit(exitcode);
    }

    Ok(exitcode)
}

fn read_input_autogz<R: BufRead>(
    mut input: R,
    solver: &mut BasicSolver,
    is_strict: bool,
) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        read_input(BufReader::new(GzDecoder::new(input)), solver, is_strict)
    } else {
        read_input(input, solver, is_strict)
    }
}

fn read_input<R: BufRead>(
    mut input: R,
    solver: &mut BasicSolver,
    is_strict: bool,
) -> io::Result<()> {
    chronosat::dimacs::parse(&mut input, solver, is_strict)
}
