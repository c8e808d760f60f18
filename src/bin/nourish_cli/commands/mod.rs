// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for nourish-cli
// ABOUTME: Provides access to replay, recommendation and configuration commands

pub mod config;
pub mod replay;
