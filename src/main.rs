// mska: Streaming readers for MOSAIK short-read alignment archives.
//
// Copyright 2026 mska contributors.
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use mska::AlignedRead;
use mska::AlignmentReader;
use mska::ArchiveError;
use mska::PositionsRead;
use mska::PositionsReader;

use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use clap::CommandFactory;
use clap::Parser;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
        .module(module_path!())
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

fn fail(err: ArchiveError) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

fn check(input_file: &Path) {
    let display = input_file.display();
    if AlignmentReader::validate(input_file, false).unwrap_or(false) {
        println!("{display}: alignment archive");
    } else if PositionsReader::validate(input_file, false).unwrap_or(false) {
        println!("{display}: aligned positions archive");
    } else {
        log::error!("{display}: not a readable archive");
        std::process::exit(1);
    }
}

fn info(input_file: &Path) {
    if AlignmentReader::validate(input_file, false).unwrap_or(false) {
        let reader = AlignmentReader::open(input_file).unwrap_or_else(|err| fail(err));

        println!("format:                 alignment archive");
        println!("reads:                  {}", reader.num_reads());
        println!("bases:                  {}", reader.num_bases());
        println!("sequencing technology:  {}", reader.sequencing_technology().name());
        let status = reader.status();
        println!(
            "status:                 {}, {}",
            if status.is_paired_end() { "paired-end" } else { "single-end" },
            if status.is_sorted() { "sorted" } else { "unsorted" },
        );
        println!("jump index:             {}", if reader.has_index() { "yes" } else { "no" });

        for group in reader.read_groups() {
            println!(
                "read group:             {} sample={} library={} center={}",
                group.read_group_id, group.sample_name, group.library_name, group.center_name
            );
        }
        for reference in reader.reference_sequences() {
            println!(
                "reference:              {} bases={} aligned={} md5={}",
                reference.name, reference.num_bases, reference.num_aligned, reference.md5
            );
        }
    } else {
        let mut reader = PositionsReader::open(input_file).unwrap_or_else(|err| fail(err));

        println!("format:                 aligned positions archive");
        println!("reads:                  {}", reader.num_reads());
        println!("anchors:                {}", reader.num_anchors());
        println!("timestamp:              {}", reader.timestamp());

        let mut anchors = Vec::new();
        reader.load_anchors(&mut anchors).unwrap_or_else(|err| fail(err));
        for anchor in &anchors {
            println!(
                "anchor:                 {} length={} begin={} end={}",
                anchor.name, anchor.length, anchor.begin, anchor.end
            );
        }
    }
}

fn cat(input_file: &Path, max_reads: Option<u64>) {
    let stdout = std::io::stdout();
    let mut conn_out = BufWriter::new(stdout.lock());

    if AlignmentReader::validate(input_file, false).unwrap_or(false) {
        let mut reader = AlignmentReader::open(input_file).unwrap_or_else(|err| fail(err));
        let mut read = AlignedRead::default();
        let mut num_printed = 0_u64;

        loop {
            if max_reads.is_some_and(|limit| num_printed >= limit) {
                break;
            }
            match reader.load_next_read(&mut read) {
                Ok(true) => (),
                Ok(false) => break,
                Err(err) => fail(err),
            }
            for (mate, alignments) in
                [(1, &read.mate1_alignments), (2, &read.mate2_alignments)]
            {
                for alignment in alignments {
                    writeln!(
                        conn_out,
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                        read.name,
                        mate,
                        reader.reference_name(alignment.reference_index).unwrap_or("*"),
                        alignment.reference_begin,
                        alignment.reference_end,
                        if alignment.orientation.is_read_reverse_complement() { '-' } else { '+' },
                        alignment.quality,
                    )
                    .unwrap();
                }
            }
            num_printed += 1;
        }
    } else {
        let mut reader = PositionsReader::open(input_file).unwrap_or_else(|err| fail(err));
        let mut read = PositionsRead::default();
        let mut num_printed = 0_u64;

        loop {
            if max_reads.is_some_and(|limit| num_printed >= limit) {
                break;
            }
            match reader.load_next_read(&mut read) {
                Ok(true) => (),
                Ok(false) => break,
                Err(err) => fail(err),
            }
            for position in &read.positions {
                writeln!(
                    conn_out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    read.name,
                    position.anchor_begin,
                    position.anchor_end,
                    position.query_begin,
                    position.query_end,
                    if position.is_reverse_complement { '-' } else { '+' },
                    position.num_substitutions,
                    position.num_insertions,
                    position.num_deletions,
                )
                .unwrap();
            }
            num_printed += 1;
        }
    }

    conn_out.flush().unwrap();
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        Some(cli::Commands::Check { input_file, verbose }) => {
            init_log(if *verbose { 2 } else { 1 });
            check(input_file);
        }

        Some(cli::Commands::Info { input_file, verbose }) => {
            init_log(if *verbose { 2 } else { 1 });
            info(input_file);
        }

        Some(cli::Commands::Cat {
            input_file,
            max_reads,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });
            cat(input_file, *max_reads);
        }

        None => {
            cli::Cli::command().print_help().unwrap();
        }
    }
}
