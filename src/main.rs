use bpaf::{construct, short, Parser};
use reprise::{
	ir::source::lex,
	op::{parse::parse, unparse::pretty_print},
	report::{report_command_error, report_lex_error, report_parse_error},
	session::{Outcome, Session, DEFAULT_WIDTH},
};
use tracing::Level;

enum InputOption {
	Direct(String),
	FilePath(String),
}

struct Options {
	input: InputOption,
	width: usize,
	verbosity: usize,
	print_instances: bool,
}

/// Runs a declaration file, printing each rendering; returns whether every command succeeded.
fn run(source: &str, options: &Options) -> bool {
	let lexed_source = match lex(source) {
		Ok(x) => x,
		Err(e) => {
			report_lex_error(source, e);
			return false;
		}
	};

	let mut session = Session::new().with_width(options.width);
	let program = match parse(&lexed_source, session.interner_mut()) {
		Ok(x) => x,
		Err(e) => {
			report_parse_error(&lexed_source, e);
			return false;
		}
	};

	for command in &program.commands {
		match session.execute(command) {
			Ok(outcome) => report_outcome(&session, outcome, options.print_instances),
			Err(e) => {
				report_command_error(&lexed_source, &e);
				return false;
			}
		}
	}
	true
}

fn report_outcome(session: &Session, outcome: Outcome, print_instances: bool) {
	let interner = session.interner();
	match outcome {
		Outcome::Declared(names) => {
			let names = names.iter().map(|name| interner.resolve(name)).collect::<Vec<_>>();
			println!("Declared {}.", names.join(", "));
		}
		Outcome::Derived(registration) => {
			let name = interner.resolve(&registration.derivation.name);
			println!("Registered {name} ({}).", registration.locality);
			if print_instances {
				let environment = session.environment();
				println!("{name} : {}", pretty_print(&registration.derivation.ty, interner, environment));
				println!("{name} := {}", pretty_print(&registration.dictionary, interner, environment));
			}
		}
		Outcome::Shown(rendered) => println!("{rendered}"),
		Outcome::Checked(rendered) => println!("Checked: {rendered}"),
	}
}

fn main() {
	let width = short('w').help("Render documents at this width").argument::<usize>("WIDTH").fallback(DEFAULT_WIDTH);
	let verbosity = short('v').help("Log more; repeat for more detail").req_flag(()).many().map(|flags| flags.len());
	let print_instances = short('p').help("Print every synthesized instance").switch();
	let direct = short('c').argument::<String>("\"source\"").help("Read input from argument").map(InputOption::Direct);
	let file_path = short('f').argument::<String>("PATH").help("Read input from file").map(InputOption::FilePath);
	let input = construct!([direct, file_path]);
	let options: Options = construct!(Options { input, width, verbosity, print_instances }).to_options().run();

	let level = match options.verbosity {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	};
	tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

	let input = match &options.input {
		InputOption::Direct(source) => source.clone(),
		InputOption::FilePath(file_path) => match std::fs::read_to_string(file_path) {
			Ok(source) => source,
			Err(e) => {
				eprintln!("error: cannot read {file_path}: {e}");
				std::process::exit(1);
			}
		},
	};

	if !run(&input, &options) {
		std::process::exit(1);
	}
}
