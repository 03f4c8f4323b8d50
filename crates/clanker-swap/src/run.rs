use {
    crate::{
        arguments::Arguments,
        command::{Command, HELP},
        config,
        domain::registry::CLANKER,
        infra::{Blockchain, ChainWallet, QuoterSdk},
        session::{Dependencies, Session, Settings, View},
    },
    anyhow::{Context, Result},
    clap::Parser,
    std::sync::Arc,
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        time::Instant,
    },
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = Arguments::parse_from(args);
    let format = if args.use_json_logs {
        observe::tracing::Format::Json
    } else {
        observe::tracing::Format::Pretty
    };
    observe::tracing::initialize(&args.log_filter, format);
    tracing::info!("running clanker swap with validated arguments:\n{}", args);

    if let Err(err) = run(args).await {
        tracing::error!(?err, "clanker swap failed");
        std::process::exit(1);
    }
}

pub async fn run(args: Arguments) -> Result<()> {
    let config = config::wallet(&args);
    let blockchain = Blockchain::new(config.rpc_url.clone());
    let node_chain_id = blockchain
        .chain_id()
        .await
        .context("RPC node is unreachable")?;
    tracing::info!(
        app = config.app_name,
        project_id = %config.project_id,
        node_chain_id,
        chain = %config.chain,
        "connected to node"
    );

    let wallet = ChainWallet::connect(
        config.rpc_url.clone(),
        args.private_key.clone(),
        args.account,
    )
    .await?;
    let quoter = QuoterSdk::new(contracts::base::V4_QUOTER, blockchain.provider().clone());
    let blockchain = Arc::new(blockchain);
    let dependencies = Dependencies {
        wallet: Arc::new(wallet),
        pool_keys: blockchain.clone(),
        tokens: blockchain.clone(),
        balances: blockchain,
        quoter: Arc::new(quoter),
        // Execution is provided by the embedding application.
        executor: None,
    };
    let settings = Settings {
        chain: config.chain,
        contracts: CLANKER,
        slippage_bps: args.slippage_bps,
        quote_refresh: args.quote_refresh_interval,
        balance_refresh: args.balance_refresh_interval,
        explorer_links: !config.is_local(),
    };

    let (mut session, mut events) = Session::new(dependencies, settings, Instant::now());
    if let Some(token) = args.token {
        session.select_token(token);
    }
    session.set_direction(args.direction);
    session.set_amount(&args.amount);

    let mut progress = session.progress();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shown: Option<View> = None;
    println!("{HELP}");

    loop {
        let now = Instant::now();
        session.poll(now);
        show(&session.view(), &mut shown);
        let deadline = session.next_deadline(now);

        tokio::select! {
            Some(event) = events.recv() => session.handle(event, Instant::now()),
            Ok(()) = progress.changed() => {}
            line = lines.next_line(), if stdin_open => match line.context("failed to read stdin")? {
                Some(line) => {
                    if !apply(&mut session, &line) {
                        break;
                    }
                }
                None => {
                    tracing::debug!("stdin closed, only following updates");
                    stdin_open = false;
                }
            },
            _ = sleep_until(deadline) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down");
    session.shutdown();
    Ok(())
}

/// Applies a line of input. Returns `false` when the user wants to quit.
fn apply(session: &mut Session, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(err) => {
            println!("{err}. {HELP}");
            return true;
        }
    };
    tracing::debug!(?command, "command");

    let accepted = match command {
        Command::Token(token) => session.select_token(token),
        Command::Direction(direction) => session.set_direction(direction),
        Command::Flip => session.set_direction(session.direction().flipped()),
        Command::Amount(amount) => session.set_amount(&amount),
        Command::Refresh => session.refresh_all(Instant::now()),
        Command::Swap => session.swap(),
        Command::Reset => {
            session.reset(Instant::now());
            true
        }
        Command::Switch => {
            session.switch_network();
            true
        }
        Command::Help => {
            println!("{HELP}");
            true
        }
        Command::Quit => return false,
    };
    if !accepted {
        println!("not possible right now");
    }
    true
}

/// Prints the view if anything but the countdown changed.
fn show(view: &View, shown: &mut Option<View>) {
    let comparable = View {
        refresh_in: None,
        ..view.clone()
    };
    if shown.as_ref() == Some(&comparable) {
        return;
    }
    println!("{view}\n");
    *shown = Some(comparable);
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
