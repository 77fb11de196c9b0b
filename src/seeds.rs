//! Starter snippets shown when a user has not yet written any code.

use std::str::FromStr;

use crate::types::Language;

/// Fixed example snippet for the given language; a generic placeholder
/// comment for anything unrecognized. Pure and total.
pub fn initial_code(language: &str) -> &'static str {
    match Language::from_str(language) {
        Ok(Language::Python) => PYTHON_SEED,
        Ok(Language::Go) => GO_SEED,
        Ok(Language::C) => C_SEED,
        Ok(Language::Cpp) => CPP_SEED,
        Err(_) => "// Write your code here",
    }
}

const PYTHON_SEED: &str = r#"# Python example
print("Hello, World!")

# Variables and arithmetic
x = 10
y = 5
print(f"The sum of {x} and {y} is {x + y}")

# Lists and loops
numbers = [1, 2, 3, 4, 5]
print(f"Sum of numbers: {sum(numbers)}")

for i in range(3):
    print(f"Loop iteration: {i}")

# Functions
def greet(name):
    return f"Hello, {name}!"

print(greet("Programmer"))
"#;

const GO_SEED: &str = r#"package main

import "fmt"

func greet(name string) string {
    return fmt.Sprintf("Hello, %s!", name)
}

func main() {
    fmt.Println("Hello, World!")

    // Variables and arithmetic
    x := 10
    y := 5
    fmt.Printf("The sum of %d and %d is %d\n", x, y, x+y)

    // Slices and loops
    numbers := []int{1, 2, 3, 4, 5}
    total := 0
    for _, num := range numbers {
        total += num
    }
    fmt.Printf("Sum of numbers: %d\n", total)

    // Functions
    fmt.Println(greet("Programmer"))
}
"#;

const C_SEED: &str = r#"#include <stdio.h>

int square(int n) {
    return n * n;
}

int main() {
    printf("Hello, World!\n");

    /* Variables and arithmetic */
    int x = 10, y = 5;
    printf("Sum: %d + %d = %d\n", x, y, x + y);

    /* Arrays and loops */
    int numbers[] = {1, 2, 3, 4, 5};
    int total = 0;
    for (int i = 0; i < 5; i++) {
        total += numbers[i];
    }
    printf("Sum of array: %d\n", total);

    /* Functions */
    printf("Square of 6: %d\n", square(6));

    return 0;
}
"#;

const CPP_SEED: &str = r#"#include <iostream>
#include <vector>
using namespace std;

int square(int n) {
    return n * n;
}

int main() {
    cout << "Hello, World!" << endl;

    // Variables and arithmetic
    int x = 10, y = 5;
    cout << "Sum: " << x << " + " << y << " = " << (x + y) << endl;

    // Vectors and loops
    vector<int> numbers = {1, 2, 3, 4, 5};
    int total = 0;
    for (int num : numbers) {
        total += num;
    }
    cout << "Sum of numbers: " << total << endl;

    // Functions
    cout << "Square of 6: " << square(6) << endl;

    return 0;
}
"#;
