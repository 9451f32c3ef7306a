//! Console front end: find one primitive polynomial of degree n mod p,
//! list all of them, or test a user-supplied polynomial.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;

use primigen::{find_all, find_one, ExitStatus, Poly, PolyOrder};

#[derive(Parser)]
#[command(
    name = "primigen",
    about = "Compute primitive polynomials of degree n modulo a prime p",
    after_help = "Examples:\n  primigen 2 4\n  primigen --all 2 4\n  primigen --test 'x^4 + x + 1, 2'"
)]
struct Cli {
    /// Prime modulus p >= 2
    #[arg(required_unless_present = "test")]
    p: Option<u64>,

    /// Degree n >= 2
    #[arg(required_unless_present = "test")]
    n: Option<u64>,

    /// List all primitive polynomials of degree n mod p
    #[arg(short, long, conflicts_with = "test")]
    all: bool,

    /// Test the given polynomial, e.g. "x^4 + x + 1, 2" (modulus defaults to 2)
    #[arg(short, long, value_name = "POLY")]
    test: Option<String>,

    /// Print operation counts when done
    #[arg(short, long)]
    stats: bool,

    /// Confirm each verdict with the brute-force maximal-order check
    /// (may take an impossibly long time for large p^n)
    #[arg(short, long)]
    confirm: bool,

    /// Skip order-m checks for primes of r dividing p - 1
    #[arg(long)]
    skip_redundant: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = e.print();
            return ExitCode::from(ExitStatus::AskForHelp as u8);
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(ExitStatus::RangeError as u8);
        }
    };
    match run(&cli) {
        Ok(()) => ExitCode::from(ExitStatus::Success as u8),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(ExitStatus::from(&e) as u8)
        }
    }
}

fn run(cli: &Cli) -> primigen::Result<()> {
    if let Some(text) = &cli.test {
        return test_given(cli, text);
    }
    let (p, n) = (cli.p.expect("clap requires p"), cli.n.expect("clap requires n"));
    let mut order = PolyOrder::new(p, n)?.with_skip_optimization(cli.skip_redundant);

    if cli.all {
        println!(
            "There are {} primitive polynomials modulo {p} of degree {n}",
            order.num_primitive_polys()
        );
        let confirm = cli.confirm;
        // Collect first: the emit callback cannot borrow the tester the
        // driver is already driving.
        let mut found = Vec::new();
        find_all(&mut order, |f| found.push(f.clone()))?;
        for f in &found {
            println!("{f}");
            if confirm {
                confirm_primitive(&mut order, f)?;
            }
        }
    } else {
        let f = find_one(&mut order)?;
        println!("Primitive polynomial modulo {p} of degree {n}");
        println!("{f}");
        if cli.confirm {
            confirm_primitive(&mut order, &f)?;
        }
    }

    if cli.stats {
        println!("{}", order.statistics);
    }
    Ok(())
}

fn test_given(cli: &Cli, text: &str) -> primigen::Result<()> {
    let f = Poly::from_str(text)?;
    let mut order = PolyOrder::new(f.modulus(), f.degree() as u64)?
        .with_skip_optimization(cli.skip_redundant);
    let table = f.reduction_table();
    let primitive = order.is_primitive(&f, &table)?;
    println!("{f} is {}primitive!", if primitive { "" } else { "NOT " });

    if cli.confirm {
        let slow = order.maximal_order(&f, &table)?;
        if slow != primitive {
            return Err(primigen::Error::Internal(format!(
                "fast test says {f} is {}primitive but the brute-force check disagrees",
                if primitive { "" } else { "not " }
            )));
        }
        println!("{f} confirmed {}primitive!", if slow { "" } else { "NOT " });
    }
    if cli.stats {
        println!("{}", order.statistics);
    }
    Ok(())
}

fn confirm_primitive(order: &mut PolyOrder, f: &Poly) -> primigen::Result<()> {
    let table = f.reduction_table();
    if !order.maximal_order(f, &table)? {
        return Err(primigen::Error::Internal(format!(
            "fast test says {f} is primitive but the brute-force check disagrees"
        )));
    }
    Ok(())
}
