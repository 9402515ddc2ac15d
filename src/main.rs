//! Roulette Wheel entry point
//!
//! Native: plays seeded rounds headlessly with jittered frame deltas and
//! prints each result. The browser build is driven through `web::WheelHandle`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::{Context, Result, anyhow, bail};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use roulette_wheel::sim::PocketLabel;
    use roulette_wheel::{SpinConfig, Table, WheelVariant};

    /// Give up on a spin that has not settled after this many frames
    const MAX_FRAMES: usize = 100_000;

    struct Args {
        config: Option<String>,
        variant: Option<WheelVariant>,
        seed: u64,
        spins: u32,
        bets: Vec<(PocketLabel, u64)>,
    }

    fn usage() -> &'static str {
        "usage: roulette-wheel [--config PATH] [--variant european|american] \
         [--seed N] [--spins N] [--bet POCKET:AMOUNT]..."
    }

    fn parse_bet(s: &str) -> Result<(PocketLabel, u64)> {
        let (pocket, amount) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("bet `{}` is not POCKET:AMOUNT", s))?;
        let label = PocketLabel::parse(pocket).ok_or_else(|| anyhow!("not a pocket: {}", pocket))?;
        let amount = amount
            .parse()
            .with_context(|| format!("bad amount in bet `{}`", s))?;
        Ok((label, amount))
    }

    fn parse_args() -> Result<Args> {
        let mut args = Args {
            config: None,
            variant: None,
            seed: 0x5EED,
            spins: 3,
            bets: Vec::new(),
        };
        let mut it = std::env::args().skip(1);
        while let Some(flag) = it.next() {
            let mut value = || it.next().ok_or_else(|| anyhow!("{} needs a value\n{}", flag, usage()));
            match flag.as_str() {
                "--config" => args.config = Some(value()?),
                "--variant" => {
                    let v = value()?;
                    args.variant = Some(
                        WheelVariant::from_str(&v).ok_or_else(|| anyhow!("unknown variant: {}", v))?,
                    );
                }
                "--seed" => args.seed = value()?.parse().context("--seed")?,
                "--spins" => args.spins = value()?.parse().context("--spins")?,
                "--bet" => args.bets.push(parse_bet(&value()?)?),
                "-h" | "--help" => {
                    println!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown argument `{}`\n{}", other, usage()),
            }
        }
        if args.bets.is_empty() {
            args.bets.push((PocketLabel::Number(17), 50));
        }
        Ok(args)
    }

    pub fn run() -> Result<()> {
        let args = parse_args()?;

        let mut config = match &args.config {
            Some(path) => SpinConfig::load_from_path(path)
                .with_context(|| format!("loading config {}", path))?,
            None => SpinConfig::default(),
        };
        if let Some(variant) = args.variant {
            config.variant = variant;
        }
        let reference_ms = config.reference_frame_ms;

        log::info!(
            "Roulette wheel (native): {} wheel, seed {}",
            config.variant.as_str(),
            args.seed
        );

        let mut table = Table::new(config, args.seed);
        // Separate stream for frame jitter so the wheel's draws stay reproducible
        let mut jitter = Pcg32::seed_from_u64(args.seed ^ 0xF4A3E);

        println!("Balance: {}", table.balance());
        for round in 1..=args.spins {
            for &(label, amount) in &args.bets {
                if let Err(e) = table.place_bet(label, amount) {
                    println!("Round {}: bet {} on {} rejected ({})", round, amount, label, e);
                }
            }
            if !table.spin().map_err(|e| anyhow!("round {}: {}", round, e))? {
                bail!("round {}: wheel was already spinning", round);
            }

            let mut frames = 0;
            while table.is_spinning() {
                if frames == MAX_FRAMES {
                    bail!("round {}: spin did not settle", round);
                }
                // Real displays never deliver perfectly even frames
                let dt = reference_ms * jitter.random_range(0.6..1.6);
                table.tick(dt);
                frames += 1;
            }

            let report = table
                .last_report()
                .copied()
                .ok_or_else(|| anyhow!("round {}: no settlement", round))?;
            let outcome = if report.is_win() {
                format!("you win ${}!", report.payout)
            } else {
                "no wins this round.".to_string()
            };
            println!(
                "Round {}: {} {} after {} frames, {} (balance {})",
                round,
                report.result.color.as_str(),
                report.result.label,
                frames,
                outcome,
                table.balance()
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
