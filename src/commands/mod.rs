// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod config;
pub mod students;
pub mod teachers;
pub mod fees;
pub mod expenses;
pub mod reports;
pub mod exporter;
pub mod doctor;
